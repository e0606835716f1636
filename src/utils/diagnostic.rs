//! Diagnostics sink
//!
//! Collects recoverable errors so that one checking pass can report every
//! independent problem. Fatal errors are turned into [`Error::Fatal`] and
//! returned to the caller, which aborts with `?`.

use serde::{Deserialize, Serialize};

use crate::utils::{Error, Location};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Fatal,
}

/// A single reported problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: Location,
}

#[derive(Debug, Default)]
pub struct Diagnostics {
    reported: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a recoverable error; checking continues afterwards
    pub fn report_error(&mut self, location: Location, message: impl Into<String>) {
        let message = message.into();
        log::debug!("error at {}: {}", location, message);
        self.reported.push(Diagnostic {
            severity: Severity::Error,
            message,
            location,
        });
    }

    /// Report a fatal error. The returned error must be propagated.
    #[must_use]
    pub fn report_fatal(&mut self, location: Location, message: impl Into<String>) -> Error {
        let message = message.into();
        log::error!("fatal at {}: {}", location, message);
        self.reported.push(Diagnostic {
            severity: Severity::Fatal,
            message: message.clone(),
            location,
        });
        Error::Fatal { location, message }
    }

    pub fn has_errors(&self) -> bool {
        !self.reported.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.reported.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.reported.iter()
    }

    /// Serialize every diagnostic as a JSON array
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.reported).unwrap_or_else(|_| "[]".to_string())
    }
}
