#![forbid(unsafe_code)]

//! The lookup seam between bindings and resource storage.
//!
//! A [`ResourceProvider`] answers `(locale, key) -> text`. Providers own
//! their fallback policy; callers make exactly one lookup per translation.

use crate::catalog::{Locale, StringCatalog};

/// Source of localized strings.
pub trait ResourceProvider {
    /// Resolve `key` for `locale`, or `None` if the provider has no value.
    fn lookup(&self, locale: &str, key: &str) -> Option<String>;

    /// Locales this provider can serve. Informational; may be empty.
    fn available_locales(&self) -> Vec<Locale> {
        Vec::new()
    }
}

impl ResourceProvider for StringCatalog {
    fn lookup(&self, locale: &str, key: &str) -> Option<String> {
        self.get(locale, key).map(str::to_string)
    }

    fn available_locales(&self) -> Vec<Locale> {
        self.locales().into_iter().map(str::to_string).collect()
    }
}

/// A provider backed by a closure.
pub struct FnProvider<F> {
    lookup: F,
}

impl<F> ResourceProvider for FnProvider<F>
where
    F: Fn(&str, &str) -> Option<String>,
{
    fn lookup(&self, locale: &str, key: &str) -> Option<String> {
        (self.lookup)(locale, key)
    }
}

impl<F> std::fmt::Debug for FnProvider<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnProvider").finish_non_exhaustive()
    }
}

/// Wrap a `(locale, key) -> Option<text>` closure as a provider.
///
/// ```
/// use lexbind_i18n::{ResourceProvider, from_fn};
///
/// let provider = from_fn(|locale, key| match (locale, key) {
///     ("fr", "Greeting") => Some("Bonjour".to_string()),
///     (_, "Greeting") => Some("Hello".to_string()),
///     _ => None,
/// });
/// assert_eq!(provider.lookup("fr", "Greeting").as_deref(), Some("Bonjour"));
/// assert_eq!(provider.lookup("en", "Other"), None);
/// ```
pub fn from_fn<F>(lookup: F) -> FnProvider<F>
where
    F: Fn(&str, &str) -> Option<String>,
{
    FnProvider { lookup }
}

/// A provider with no resources. Every lookup misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyProvider;

impl ResourceProvider for EmptyProvider {
    fn lookup(&self, _locale: &str, _key: &str) -> Option<String> {
        None
    }
}
