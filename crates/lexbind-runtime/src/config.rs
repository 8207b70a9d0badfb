#![forbid(unsafe_code)]

//! Configuration for the localize dictionary.
//!
//! # Sources
//!
//! Environment (always available):
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `LEXBIND_CULTURE` | Initial culture tag (`fr-FR`, `de_AT.UTF-8`) |
//! | `LEXBIND_FALLBACK` | Comma-separated fallback cultures |
//! | `LEXBIND_MISSING_KEY` | `key`, `empty` or `marker` |
//!
//! Without `LEXBIND_CULTURE` the system locale (`LC_ALL`, `LC_MESSAGES`,
//! `LANG`) is used, then `"en"`.
//!
//! Files (feature `config`):
//!
//! ```toml
//! # lexbind.toml
//! culture = "fr-FR"
//! fallback = ["fr", "en"]
//! missing_key = "marker"
//! ```
//!
//! ```rust,ignore
//! let config = LocalizeConfig::from_toml_file("lexbind.toml")?.with_env_overrides_from_process();
//! ```

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use lexbind_i18n::{DEFAULT_LOCALE, Locale, detect_system_locale_with, normalize_tag};
use tracing::warn;

/// Environment variable naming the initial culture.
pub const ENV_CULTURE: &str = "LEXBIND_CULTURE";
/// Environment variable listing fallback cultures.
pub const ENV_FALLBACK: &str = "LEXBIND_FALLBACK";
/// Environment variable selecting the [`MissingKeyPolicy`].
pub const ENV_MISSING_KEY: &str = "LEXBIND_MISSING_KEY";

/// How a key with no translation is displayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum MissingKeyPolicy {
    /// Show the key itself.
    #[default]
    #[cfg_attr(feature = "config", serde(alias = "key"))]
    ShowKey,
    /// Show nothing.
    Empty,
    /// Show the key in brackets: `[Greeting]`.
    Marker,
}

impl MissingKeyPolicy {
    /// Parse `key`/`show_key`, `empty` or `marker` (case-insensitive).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "key" | "show_key" | "showkey" => Some(Self::ShowKey),
            "empty" | "none" => Some(Self::Empty),
            "marker" | "bracket" => Some(Self::Marker),
            _ => None,
        }
    }

    /// Display text for a missing `key`.
    #[must_use]
    pub fn render(self, key: &str) -> String {
        match self {
            Self::ShowKey => key.to_string(),
            Self::Empty => String::new(),
            Self::Marker => format!("[{key}]"),
        }
    }
}

/// Settings the shared [`LocalizeDictionary`](crate::LocalizeDictionary)
/// starts from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct LocalizeConfig {
    /// Initial culture. `None` means system detection, then `"en"`.
    pub culture: Option<String>,
    /// Cultures tried after the active one misses.
    pub fallback: Vec<String>,
    /// Rendering of keys with no translation.
    pub missing_key: MissingKeyPolicy,
}

impl LocalizeConfig {
    /// Build from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Build from a custom environment lookup (for tests).
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().with_env_overrides(get_env)
    }

    /// Apply environment overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides_from_process(self) -> Self {
        self.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides on top of this config.
    ///
    /// `LEXBIND_*` values win over what is already set. If no culture is set
    /// afterwards, the system locale is filled in when one is detected.
    #[must_use]
    pub fn with_env_overrides<F>(mut self, get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(culture) = get_env(ENV_CULTURE).filter(|v| !v.trim().is_empty()) {
            self.culture = Some(culture.trim().to_string());
        }
        if let Some(list) = get_env(ENV_FALLBACK) {
            self.fallback = list
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(value) = get_env(ENV_MISSING_KEY) {
            match MissingKeyPolicy::parse(&value) {
                Some(policy) => self.missing_key = policy,
                None => warn!(value = %value, "ignoring unknown LEXBIND_MISSING_KEY"),
            }
        }
        if self.culture.is_none() {
            self.culture = detect_system_locale_with(&get_env);
        }
        self
    }

    /// The culture to start in: the configured one if it parses, else
    /// [`DEFAULT_LOCALE`].
    #[must_use]
    pub fn resolved_culture(&self) -> Locale {
        self.culture
            .as_deref()
            .and_then(|tag| normalize_tag(tag).ok())
            .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
    }

    /// Check every tag. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if let Some(culture) = &self.culture
            && let Err(e) = normalize_tag(culture)
        {
            errors.push(format!("culture: {e}"));
        }
        for (i, tag) in self.fallback.iter().enumerate() {
            if let Err(e) = normalize_tag(tag) {
                errors.push(format!("fallback[{i}]: {e}"));
            }
        }
        errors
    }

    /// `self` if [`validate`](Self::validate) finds nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] with every problem found.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_json_str(&content)
    }
}

/// Errors that can occur when loading a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading a file.
    Io(std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Validation errors.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "TOML parse error: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "JSON parse error: {e}"),
            Self::Validation(errors) => write!(f, "validation errors: {}", errors.join("; ")),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_env_defaults_to_english() {
        let config = LocalizeConfig::from_env_with(env(&[]));
        assert_eq!(config, LocalizeConfig::default());
        assert_eq!(config.resolved_culture(), "en");
    }

    #[test]
    fn explicit_culture_beats_system_locale() {
        let config = LocalizeConfig::from_env_with(env(&[
            (ENV_CULTURE, "fr_CA"),
            ("LANG", "de_DE.UTF-8"),
        ]));
        assert_eq!(config.resolved_culture(), "fr-CA");
    }

    #[test]
    fn system_locale_used_without_explicit_culture() {
        let config = LocalizeConfig::from_env_with(env(&[("LANG", "de_DE.UTF-8")]));
        assert_eq!(config.culture.as_deref(), Some("de-DE"));
    }

    #[test]
    fn fallback_list_is_split_and_trimmed() {
        let config = LocalizeConfig::from_env_with(env(&[(ENV_FALLBACK, " fr , ,en,")]));
        assert_eq!(config.fallback, vec!["fr".to_string(), "en".to_string()]);
    }

    #[test]
    fn missing_key_policy_from_env() {
        let config = LocalizeConfig::from_env_with(env(&[(ENV_MISSING_KEY, "Marker")]));
        assert_eq!(config.missing_key, MissingKeyPolicy::Marker);
        let config = LocalizeConfig::from_env_with(env(&[(ENV_MISSING_KEY, "sparkles")]));
        assert_eq!(config.missing_key, MissingKeyPolicy::ShowKey);
    }

    #[test]
    fn env_overrides_existing_values() {
        let base = LocalizeConfig {
            culture: Some("en".into()),
            fallback: vec!["en".into()],
            missing_key: MissingKeyPolicy::Empty,
        };
        let merged = base.with_env_overrides(env(&[(ENV_CULTURE, "it")]));
        assert_eq!(merged.culture.as_deref(), Some("it"));
        assert_eq!(merged.fallback, vec!["en".to_string()]);
        assert_eq!(merged.missing_key, MissingKeyPolicy::Empty);
    }

    #[test]
    fn invalid_culture_resolves_to_default_and_fails_validation() {
        let config = LocalizeConfig {
            culture: Some("C".into()),
            fallback: vec!["en".into(), "!!".into()],
            missing_key: MissingKeyPolicy::ShowKey,
        };
        assert_eq!(config.resolved_culture(), "en");
        let errors = config.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("culture"));
        assert!(errors[1].starts_with("fallback[1]"));
        let err = config.validated().unwrap_err();
        assert!(err.to_string().starts_with("validation errors"));
    }

    #[test]
    fn missing_key_rendering() {
        assert_eq!(MissingKeyPolicy::ShowKey.render("K"), "K");
        assert_eq!(MissingKeyPolicy::Empty.render("K"), "");
        assert_eq!(MissingKeyPolicy::Marker.render("K"), "[K]");
        assert_eq!(MissingKeyPolicy::parse(" EMPTY "), Some(MissingKeyPolicy::Empty));
    }
}
