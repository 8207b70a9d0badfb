#![forbid(unsafe_code)]

//! Localization resources for lexbind.
//!
//! Provides locale tag handling, externalized string storage with key-based
//! lookup and fallback chains, `{name}` interpolation, and the
//! [`ResourceProvider`] seam that the binding runtime translates through.
//!
//! # Role in lexbind
//! `lexbind-i18n` knows nothing about bindings, listeners or UI elements. The
//! runtime asks a provider for `(locale, key) -> text` and treats the answer
//! as opaque, so hosts can swap the catalog for their own resource store.

pub mod catalog;
pub mod locale;
pub mod provider;

pub use catalog::{I18nError, Locale, LocaleStrings, StringCatalog};
pub use locale::{
    DEFAULT_LOCALE, detect_system_locale, detect_system_locale_with, lookup_chain, normalize_tag,
    parent_tag,
};
pub use provider::{EmptyProvider, FnProvider, ResourceProvider, from_fn};
