//! Error handling for the middle-end
//!
//! Only errors that abort compilation live here. Recoverable problems are
//! reported through [`Diagnostics`](super::Diagnostics) instead.

use crate::utils::Location;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Compilation-aborting error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A fatal error diagnosed at a source location
    #[error("{location}: fatal error: {message}")]
    Fatal { location: Location, message: String },

    /// An invariant of an earlier pass or of this engine was broken
    #[error("internal compiler error: {0}")]
    Internal(String),

    /// Reading input or writing output failed
    #[error("I/O error: {0}")]
    Io(String),

    /// The C compiler rejected the generated source
    #[error("code generation error: {0}")]
    CodeGen(String),
}

impl Error {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the location associated with this error
    pub fn location(&self) -> Option<Location> {
        match self {
            Self::Fatal { location, .. } => Some(*location),
            _ => None,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}
