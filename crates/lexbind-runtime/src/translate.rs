#![forbid(unsafe_code)]

//! Resource-key to display-text conversion.

use std::rc::Rc;

use crate::dictionary::LocalizeDictionary;
use crate::host::ValueConverter;

/// Converts a resource key into its translation in the dictionary's current
/// culture.
///
/// The culture is read at conversion time, so re-running the conversion
/// after a culture switch yields the new translation.
#[derive(Debug, Clone)]
pub struct TranslateConverter {
    dictionary: Rc<LocalizeDictionary>,
}

impl TranslateConverter {
    #[must_use]
    pub fn new(dictionary: Rc<LocalizeDictionary>) -> Self {
        Self { dictionary }
    }

    /// Converter bound to [`LocalizeDictionary::instance`].
    #[must_use]
    pub fn global() -> Self {
        Self::new(LocalizeDictionary::instance())
    }

    #[must_use]
    pub fn dictionary(&self) -> &Rc<LocalizeDictionary> {
        &self.dictionary
    }
}

impl ValueConverter for TranslateConverter {
    fn convert(&self, key: &str) -> String {
        if key.is_empty() {
            return String::new();
        }
        self.dictionary.translate(key)
    }
}
