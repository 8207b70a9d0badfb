#![forbid(unsafe_code)]

//! lexbind public facade crate.
//!
//! Re-exports the binding runtime and resource types behind one name and
//! offers a prelude for day-to-day usage.
//!
//! ```
//! use lexbind::prelude::*;
//!
//! let mut catalog = StringCatalog::new();
//! catalog.add_locale("en", [("Title", "Settings")].into_iter().collect::<LocaleStrings>());
//! catalog.add_locale("de", [("Title", "Einstellungen")].into_iter().collect::<LocaleStrings>());
//! let dictionary = std::rc::Rc::new(LocalizeDictionary::new(std::rc::Rc::new(catalog), "en")?);
//!
//! let key = Observable::new("Title".to_string());
//! let header = Element::new("window");
//! BindingLoc::with_dictionary(Binding::new(&key), &dictionary)
//!     .provide_value(&ValueContext::for_element(&header, PropertyId::HEADER));
//!
//! dictionary.set_culture("de_DE.UTF-8")?;
//! assert_eq!(header.get(PropertyId::HEADER).as_deref(), Some("Einstellungen"));
//! # Ok::<(), lexbind::Error>(())
//! ```

use std::fmt;

// --- Resource re-exports ---------------------------------------------------

pub use lexbind_i18n::{
    I18nError, Locale, LocaleStrings, ResourceProvider, StringCatalog, normalize_tag,
};

// --- Runtime re-exports ----------------------------------------------------

pub use lexbind_runtime::{
    Binding, BindingExpression, BindingLoc, ConfigError, DictionaryEvent, DictionaryEventArgs,
    DictionaryEventKind, DictionaryEventListener, Element, LocalizeConfig, LocalizeDictionary,
    MissingKeyPolicy, NotifyReport, Observable, PropertyId, ProvidedValue, RefreshError,
    ServiceProvider, TranslateConverter, ValueContext, ValueConverter,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for lexbind users.
#[derive(Debug)]
pub enum Error {
    /// Malformed locale tag or catalog conflict.
    I18n(I18nError),
    /// A binding could not be refreshed.
    Refresh(RefreshError),
    /// Configuration could not be loaded or validated.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I18n(err) => write!(f, "{err}"),
            Self::Refresh(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::I18n(err) => Some(err),
            Self::Refresh(err) => Some(err),
            Self::Config(err) => Some(err),
        }
    }
}

impl From<I18nError> for Error {
    fn from(err: I18nError) -> Self {
        Self::I18n(err)
    }
}

impl From<RefreshError> for Error {
    fn from(err: RefreshError) -> Self {
        Self::Refresh(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Standard result type for lexbind APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Binding, BindingLoc, Element, Error, LocaleStrings, LocalizeConfig, LocalizeDictionary,
        Observable, PropertyId, Result, StringCatalog, ValueContext,
    };

    pub use crate::{i18n, runtime};
}

pub use lexbind_i18n as i18n;
pub use lexbind_runtime as runtime;
