#![forbid(unsafe_code)]

//! String catalog with parent-tag and explicit fallback resolution.
//!
//! # Invariants
//!
//! 1. **Resolution terminates**: a lookup visits the requested tag, its
//!    parents, then the fallback chain, each locale at most once.
//! 2. **Interpolation is single-pass**: `format()` replaces `{name}` tokens
//!    once; substituted text is never re-scanned.
//! 3. **Immutable reads**: lookups never mutate the catalog, so a catalog can
//!    be shared behind `Rc` by every binding that translates through it.
//! 4. **Canonical tags**: every tag passed in, stored or looked up, goes
//!    through [`normalize_tag`], so `pt_BR`, `pt-br` and `pt-BR` name the
//!    same locale. Tags that do not parse are used verbatim.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing key | Key not in any visited locale | Returns `None` |
//! | Missing locale | Locale not loaded | Falls through to parents/chain |
//! | Bad interpolation arg | `{name}` but no `name` arg | Token left as-is |
//! | Duplicate key | `try_insert` of an existing key | `I18nError::DuplicateKey` |

use std::collections::HashMap;

use crate::locale::{lookup_chain, normalize_tag};

/// Locale identifier (e.g., `"en"`, `"en-US"`, `"fr-CA"`).
pub type Locale = String;

/// Errors from i18n operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum I18nError {
    /// A locale string was malformed.
    InvalidLocale(String),
    /// Duplicate key in the same locale.
    DuplicateKey { locale: String, key: String },
}

impl std::fmt::Display for I18nError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLocale(l) => write!(f, "invalid locale: {l}"),
            Self::DuplicateKey { locale, key } => {
                write!(f, "duplicate key '{key}' in locale '{locale}'")
            }
        }
    }
}

impl std::error::Error for I18nError {}

/// Strings for a single locale.
#[derive(Debug, Clone, Default)]
pub struct LocaleStrings {
    strings: HashMap<String, String>,
}

impl LocaleStrings {
    /// Create an empty locale string set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a string.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.strings.insert(key.into(), value.into());
    }

    /// Insert a string, refusing to replace an existing key.
    ///
    /// `locale` is only used to label the error.
    pub fn try_insert(
        &mut self,
        locale: &str,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), I18nError> {
        let key = key.into();
        if self.strings.contains_key(&key) {
            return Err(I18nError::DuplicateKey {
                locale: locale.to_string(),
                key,
            });
        }
        self.strings.insert(key, value.into());
        Ok(())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Iterate over all keys in this locale.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.strings.keys().map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for LocaleStrings
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            strings: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Central string catalog.
///
/// # Example
///
/// ```
/// use lexbind_i18n::catalog::{LocaleStrings, StringCatalog};
///
/// let mut catalog = StringCatalog::new();
/// catalog.add_locale("en", [("Greeting", "Hello"), ("Welcome", "Welcome, {name}!")]
///     .into_iter()
///     .collect::<LocaleStrings>());
/// catalog.add_locale("fr", [("Greeting", "Bonjour")].into_iter().collect::<LocaleStrings>());
/// catalog.set_fallback_chain(vec!["en".into()]);
///
/// assert_eq!(catalog.get("fr-CA", "Greeting"), Some("Bonjour"));
/// assert_eq!(
///     catalog.format("fr", "Welcome", &[("name", "Alice")]),
///     Some("Welcome, Alice!".into())
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct StringCatalog {
    locales: HashMap<Locale, LocaleStrings>,
    fallback_chain: Vec<Locale>,
}

impl StringCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the strings for a locale.
    pub fn add_locale(&mut self, locale: impl Into<String>, strings: LocaleStrings) {
        self.locales.insert(canonical_tag(&locale.into()), strings);
    }

    /// Mutable access to a locale's strings, creating the locale if needed.
    pub fn locale_mut(&mut self, locale: &str) -> &mut LocaleStrings {
        self.locales.entry(canonical_tag(locale)).or_default()
    }

    /// Set the chain tried after the requested tag and its parents.
    ///
    /// Example: `["es", "en"]`: a key missing from `es-MX` and `es` is looked
    /// up in `en`.
    pub fn set_fallback_chain(&mut self, chain: Vec<Locale>) {
        self.fallback_chain = chain.iter().map(|tag| canonical_tag(tag)).collect();
    }

    #[must_use]
    pub fn fallback_chain(&self) -> &[Locale] {
        &self.fallback_chain
    }

    /// Look up a string by key.
    ///
    /// Tries `locale`, each parent of `locale` (`fr-CA` → `fr`), then the
    /// fallback chain, skipping locales already tried.
    #[must_use]
    pub fn get(&self, locale: &str, key: &str) -> Option<&str> {
        let requested = canonical_tag(locale);
        let mut tried: Vec<&str> = Vec::new();
        let candidates = lookup_chain(&requested).chain(self.fallback_chain.iter().map(String::as_str));
        for tag in candidates {
            if tried.contains(&tag) {
                continue;
            }
            tried.push(tag);
            if let Some(value) = self.locales.get(tag).and_then(|ls| ls.get(key)) {
                return Some(value);
            }
        }
        None
    }

    /// Look up a string and perform `{name}` interpolation.
    ///
    /// Each `(name, value)` pair in `args` replaces `{name}` in the template.
    /// Tokens without matching args are left as-is.
    #[must_use]
    pub fn format(&self, locale: &str, key: &str, args: &[(&str, &str)]) -> Option<String> {
        self.get(locale, key)
            .map(|template| interpolate(template, args))
    }

    /// All registered locale tags, sorted.
    #[must_use]
    pub fn locales(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.locales.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// All unique keys across every locale, sorted.
    #[must_use]
    pub fn all_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .locales
            .values()
            .flat_map(|ls| ls.keys().map(String::from))
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    /// Keys from [`all_keys`](Self::all_keys) that `locale` cannot resolve
    /// even after fallback, sorted.
    #[must_use]
    pub fn missing_keys(&self, locale: &str) -> Vec<String> {
        self.all_keys()
            .into_iter()
            .filter(|key| self.get(locale, key).is_none())
            .collect()
    }
}

fn canonical_tag(tag: &str) -> Locale {
    normalize_tag(tag).unwrap_or_else(|_| tag.to_string())
}

/// Single-pass `{name}` interpolation. Unmatched tokens left as-is.
pub(crate) fn interpolate(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match args.iter().find(|(arg, _)| *arg == name) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
