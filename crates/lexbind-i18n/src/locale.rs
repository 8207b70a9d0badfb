#![forbid(unsafe_code)]

//! Locale tag normalization, parent derivation and system detection.
//!
//! Tags are kept in BCP-47 shape: lowercase language, titlecase script,
//! uppercase region (`zh-Hant-TW`). POSIX forms such as `en_US.UTF-8` or
//! `de_DE@euro` are accepted and normalized.

use crate::catalog::{I18nError, Locale};

/// Culture used when neither configuration nor the environment name one.
pub const DEFAULT_LOCALE: &str = "en";

/// Environment variables consulted for the system locale, highest priority
/// first.
const LOCALE_ENV_VARS: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// Normalize a locale tag.
///
/// # Errors
///
/// Returns [`I18nError::InvalidLocale`] when the tag is empty, the language
/// subtag is not 2-8 ASCII letters, or any later subtag is not 1-8 ASCII
/// alphanumerics. `C` and `POSIX` are rejected the same way.
///
/// ```
/// use lexbind_i18n::normalize_tag;
///
/// assert_eq!(normalize_tag("en_US.UTF-8").unwrap(), "en-US");
/// assert_eq!(normalize_tag("zh-hant-tw").unwrap(), "zh-Hant-TW");
/// assert!(normalize_tag("C").is_err());
/// ```
pub fn normalize_tag(raw: &str) -> Result<Locale, I18nError> {
    let trimmed = raw.trim();
    let base = trimmed
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .replace('_', "-");

    let mut parts = base.split('-');
    let language = parts.next().unwrap_or_default();
    if !(2..=8).contains(&language.len())
        || !language.chars().all(|c| c.is_ascii_alphabetic())
        || language.eq_ignore_ascii_case("posix")
    {
        return Err(I18nError::InvalidLocale(raw.to_string()));
    }

    let mut tag = language.to_ascii_lowercase();
    for part in parts {
        if part.is_empty()
            || part.len() > 8
            || !part.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(I18nError::InvalidLocale(raw.to_string()));
        }
        tag.push('-');
        let all_alpha = part.chars().all(|c| c.is_ascii_alphabetic());
        match part.len() {
            2 if all_alpha => tag.push_str(&part.to_ascii_uppercase()),
            4 if all_alpha => {
                let (head, tail) = part.split_at(1);
                tag.push_str(&head.to_ascii_uppercase());
                tag.push_str(&tail.to_ascii_lowercase());
            }
            _ => tag.push_str(&part.to_ascii_lowercase()),
        }
    }
    Ok(tag)
}

/// The tag with its last subtag removed, if there is one.
///
/// `"fr-CA"` → `Some("fr")`, `"fr"` → `None`.
#[must_use]
pub fn parent_tag(tag: &str) -> Option<&str> {
    tag.rsplit_once('-').map(|(parent, _)| parent)
}

/// The tag followed by each of its parents, most specific first.
pub fn lookup_chain(tag: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(Some(tag).filter(|t| !t.is_empty()), |t| parent_tag(*t))
}

/// Detect the system locale from the process environment.
#[must_use]
pub fn detect_system_locale() -> Option<Locale> {
    detect_system_locale_with(|key| std::env::var(key).ok())
}

/// Detect the system locale using a custom environment lookup (for tests).
///
/// The first non-empty variable among `LC_ALL`, `LC_MESSAGES` and `LANG`
/// decides. If it does not parse (`C`, `POSIX`), no locale is detected.
#[must_use]
pub fn detect_system_locale_with<F>(get_env: F) -> Option<Locale>
where
    F: Fn(&str) -> Option<String>,
{
    let value = LOCALE_ENV_VARS
        .iter()
        .filter_map(|key| get_env(key))
        .find(|value| !value.trim().is_empty())?;
    normalize_tag(&value).ok()
}
