#![forbid(unsafe_code)]

//! Localized resource dictionary and its change broadcast.
//!
//! - [`DictionaryEvent`]: weak-listener hub. Listeners register once and are
//!   dropped from it automatically when nothing else owns them.
//! - [`LocalizeDictionary`]: active culture and resource provider. Mutations
//!   broadcast through its hub.
//!
//! # Invariants
//!
//! 1. The hub never holds a strong reference to a listener.
//! 2. A listener that has been dropped is never invoked.
//! 3. One listener's panic never prevents delivery to the others.
//! 4. The hub's borrow is released before any listener runs, so listeners
//!    may register, notify or mutate the dictionary re-entrantly.

pub mod event;
pub mod localize;

pub use event::{
    DictionaryEvent, DictionaryEventArgs, DictionaryEventKind, DictionaryEventListener,
    NotifyReport,
};
pub use localize::LocalizeDictionary;
