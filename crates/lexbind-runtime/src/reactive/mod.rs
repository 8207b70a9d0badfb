#![forbid(unsafe_code)]

//! Change-tracked view-model values.
//!
//! - [`Observable`]: shared, version-tracked value with subscriber callbacks.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//!
//! Subscribers are stored as `Weak` function pointers, the same ownership
//! rule the dictionary event hub applies to its listeners.

pub mod observable;

pub use observable::{Observable, Subscription};
