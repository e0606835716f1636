//! Utility module

mod diagnostic;
mod error;
mod location;

pub use diagnostic::{Diagnostic, Diagnostics, Severity};
pub use error::{Error, Result};
pub use location::Location;
