#![forbid(unsafe_code)]

//! Broadcast of "the dictionary changed" to weakly-held listeners.
//!
//! # Design
//!
//! [`DictionaryEvent`] stores each listener as a `Weak<dyn
//! DictionaryEventListener>`. Registering never adds a strong reference, so
//! the hub is never the reason a listener stays alive and listeners never
//! need to unregister. On [`notify`](DictionaryEvent::notify) the hub prunes
//! entries that no longer upgrade, snapshots the live ones, releases its
//! borrow and only then calls them.
//!
//! # Failure Modes
//!
//! - **Panicking listener**: caught per listener with `catch_unwind`, logged
//!   at `warn`, counted in [`NotifyReport::panicked`]. Remaining listeners
//!   still receive the event.
//! - **Registration during delivery**: lands in the list but is not part of
//!   the in-flight snapshot; it sees the next event.
//! - **Duplicate registration**: each entry is delivered to, so a listener
//!   added twice is called twice per event.

use std::any::Any;
use std::cell::RefCell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::{Rc, Weak};

use tracing::{debug, info_span, warn};
use web_time::Instant;

use super::localize::LocalizeDictionary;

/// Callback contract for anything that wants dictionary change events.
pub trait DictionaryEventListener {
    /// Called once per [`DictionaryEvent::notify`] while the listener is
    /// alive. `sender` and `args` are advisory.
    fn resource_changed(&self, sender: &dyn Any, args: &DictionaryEventArgs);
}

/// What changed in the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DictionaryEventKind {
    /// The active culture switched.
    CultureChanged,
    /// A different resource provider was installed.
    ProviderChanged,
    /// The provider's data changed in place.
    ResourcesUpdated,
    /// Explicit refresh request.
    Refresh,
}

impl DictionaryEventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CultureChanged => "culture_changed",
            Self::ProviderChanged => "provider_changed",
            Self::ResourcesUpdated => "resources_updated",
            Self::Refresh => "refresh",
        }
    }
}

/// Payload delivered with each event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryEventArgs {
    pub kind: DictionaryEventKind,
    /// Free-form detail, e.g. the new culture tag.
    pub tag: Option<String>,
}

impl DictionaryEventArgs {
    #[must_use]
    pub fn new(kind: DictionaryEventKind) -> Self {
        Self { kind, tag: None }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// Outcome counters for one [`DictionaryEvent::notify`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotifyReport {
    /// Listeners whose callback returned normally.
    pub delivered: usize,
    /// Expired entries removed before delivery.
    pub pruned: usize,
    /// Listeners whose callback panicked.
    pub panicked: usize,
}

/// Weak-listener broadcast hub.
///
/// Single-threaded: the hub and its listeners live on the UI thread.
#[derive(Default)]
pub struct DictionaryEvent {
    listeners: RefCell<Vec<Weak<dyn DictionaryEventListener>>>,
}

impl std::fmt::Debug for DictionaryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictionaryEvent")
            .field("listeners", &self.listener_count())
            .field("live", &self.live_listener_count())
            .finish()
    }
}

impl DictionaryEvent {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` against the hub of the process-wide
    /// [`LocalizeDictionary::instance`].
    pub fn with_global<R>(f: impl FnOnce(&DictionaryEvent) -> R) -> R {
        let dictionary = LocalizeDictionary::instance();
        f(dictionary.event())
    }

    /// Register a listener without extending its lifetime.
    pub fn add_listener<L>(&self, listener: &Rc<L>)
    where
        L: DictionaryEventListener + 'static,
    {
        let weak = Rc::downgrade(listener) as Weak<dyn DictionaryEventListener>;
        self.add_weak_listener(weak);
    }

    /// Register an already-weak handle. An expired handle is accepted and
    /// pruned on the next notify.
    pub fn add_weak_listener(&self, listener: Weak<dyn DictionaryEventListener>) {
        self.listeners.borrow_mut().push(listener);
    }

    /// Registered entries, including expired ones not yet pruned.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Entries whose listener is still alive.
    #[must_use]
    pub fn live_listener_count(&self) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// Deliver `args` to every live listener.
    pub fn notify(&self, sender: &dyn Any, args: &DictionaryEventArgs) -> NotifyReport {
        let (live, pruned) = {
            let mut listeners = self.listeners.borrow_mut();
            let before = listeners.len();
            listeners.retain(|w| w.strong_count() > 0);
            let pruned = before - listeners.len();
            let live: Vec<Rc<dyn DictionaryEventListener>> =
                listeners.iter().filter_map(Weak::upgrade).collect();
            (live, pruned)
        };

        let started = Instant::now();
        let span = info_span!(
            "lexbind.dictionary.notify",
            kind = args.kind.as_str(),
            listeners = live.len() as u64,
            pruned = pruned as u64,
            duration_us = tracing::field::Empty
        )
        .entered();

        let mut panicked = 0;
        for listener in &live {
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                listener.resource_changed(sender, args);
            }));
            if let Err(payload) = outcome {
                panicked += 1;
                warn!(
                    panic = panic_message(payload.as_ref()),
                    "dictionary listener panicked; continuing delivery"
                );
            }
        }

        let duration_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        span.record("duration_us", duration_us);
        debug!(
            delivered = live.len() - panicked,
            pruned, panicked, duration_us, "dictionary event delivered"
        );

        NotifyReport {
            delivered: live.len() - panicked,
            pruned,
            panicked,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
