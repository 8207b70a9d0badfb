#![forbid(unsafe_code)]

//! Refresh-path errors.
//!
//! None of these reach the user. The dictionary listener path logs them at
//! `debug` and the display keeps its previous value.

use std::fmt;

use crate::host::PropertyId;

/// Why a binding could not be refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    /// No element/property pair was captured: `provide_value` never ran, or
    /// ran in a context without a live element.
    Unresolved,
    /// The element the binding targeted has been dropped.
    TargetDropped,
    /// The element has no binding expression for the property.
    NoExpression(PropertyId),
}

impl fmt::Display for RefreshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved => write!(f, "binding target was never resolved"),
            Self::TargetDropped => write!(f, "binding target element was dropped"),
            Self::NoExpression(property) => {
                write!(f, "no binding expression for property '{property}'")
            }
        }
    }
}

impl std::error::Error for RefreshError {}
