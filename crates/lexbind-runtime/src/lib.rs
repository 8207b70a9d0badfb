#![forbid(unsafe_code)]

//! lexbind runtime
//!
//! Localized bindings that refresh themselves when the active culture or the
//! resource set changes, without the change source keeping them alive.
//!
//! # Key Components
//!
//! - [`DictionaryEvent`] - Weak-listener broadcast hub
//! - [`LocalizeDictionary`] - Active culture, resource provider, shared hub
//! - [`BindingLoc`] - Binding adapter that translates and self-refreshes
//! - [`TranslateConverter`] - Resource key to display text
//! - [`Element`], [`Binding`], [`BindingExpression`] - Minimal host binding model
//! - [`Observable`] - Change-tracked view-model value
//! - [`LocalizeConfig`] - Startup culture, fallbacks and missing-key policy
//!
//! # Role in lexbind
//! `lexbind-runtime` sits between the resource store (`lexbind-i18n`) and
//! whatever displays text. Culture switches go in through
//! [`LocalizeDictionary`]; refreshed property values come out on
//! [`Element`]s.
//!
//! # Threading
//! Everything here is `Rc`-based and must stay on the thread that owns the
//! UI. Each thread that calls [`LocalizeDictionary::instance`] gets its own
//! dictionary.

pub mod binding_loc;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod host;
pub mod reactive;
pub mod translate;

pub use binding_loc::BindingLoc;
pub use config::{
    ConfigError, ENV_CULTURE, ENV_FALLBACK, ENV_MISSING_KEY, LocalizeConfig, MissingKeyPolicy,
};
pub use dictionary::{
    DictionaryEvent, DictionaryEventArgs, DictionaryEventKind, DictionaryEventListener,
    LocalizeDictionary, NotifyReport,
};
pub use error::RefreshError;
pub use host::{
    Binding, BindingExpression, Element, FnConverter, PropertyId, ProvideValueTarget,
    ProvidedValue, ServiceProvider, TargetObject, ValueContext, ValueConverter, converter_fn,
};
pub use reactive::{Observable, Subscription};
pub use translate::TranslateConverter;
