#![forbid(unsafe_code)]

//! View-model property with change notification.
//!
//! [`Observable<T>`] keeps a value in `Rc<RefCell<..>>` shared storage. A
//! [`Binding`](crate::host::Binding) reads the resource key from one, and its
//! [`BindingExpression`](crate::host::BindingExpression) subscribes so that a
//! new key is pushed to the target element without waiting for a dictionary
//! event.
//!
//! # Failure Modes
//!
//! - **Re-entrant set**: a subscriber may call `set()` on the same
//!   observable. The borrow is released before callbacks run, so the nested
//!   notification completes before the outer loop continues.
//! - **Held subscriptions**: callbacks stay registered for as long as their
//!   [`Subscription`] guard lives. Dead weak entries are pruned on `notify()`
//!   and `subscribe()`.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::trace;

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

struct ObservableInner<T> {
    value: T,
    version: u64,
    subscribers: Vec<CallbackWeak<T>>,
}

/// A shared, version-tracked value with change notification.
///
/// Clones are handles to the same value and the same subscriber list.
///
/// # Invariants
///
/// 1. `version` increments by exactly 1 on each value-changing mutation.
/// 2. `set(v)` where `v == current` is a no-op.
/// 3. Callbacks whose [`Subscription`] was dropped are never invoked.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create an observable at version 0 with no subscribers.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value for the duration of `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Replace the value, notifying subscribers if it changed.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
    }

    /// Register a callback invoked with the new value after each change.
    ///
    /// The observable only keeps a weak handle; the returned guard owns the
    /// callback. Entries whose guard was dropped are pruned here as well as on
    /// change, so a value that never changes does not accumulate them.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        let mut inner = self.inner.borrow_mut();
        inner.subscribers.retain(|w| w.strong_count() > 0);
        inner.subscribers.push(Rc::downgrade(&strong));
        drop(inner);
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Increments by 1 on each value-changing mutation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Subscribers whose guard is still alive.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    fn notify(&self) {
        let (value, callbacks): (T, Vec<CallbackRc<T>>) = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            let callbacks = inner.subscribers.iter().filter_map(Weak::upgrade).collect();
            (inner.value.clone(), callbacks)
        };
        trace!(subscribers = callbacks.len(), "observable changed");
        for cb in &callbacks {
            cb(&value);
        }
    }
}

/// RAII guard owning a subscriber callback.
///
/// Dropping it drops the only strong reference to the callback, so the weak
/// entry in the observable fails to upgrade from then on.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
