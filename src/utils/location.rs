//! Source location tracking

use std::fmt;

use serde::{Deserialize, Serialize};

/// A position in the source code that an IR node was desugared from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File ID
    pub file_id: usize,
    /// 1-based line, 0 when unknown
    pub line: u32,
    /// 1-based column, 0 when unknown
    pub column: u32,
}

impl Location {
    pub fn new(file_id: usize, line: u32, column: u32) -> Self {
        Self { file_id, line, column }
    }

    /// Location used for compiler-generated nodes (builtins)
    pub fn unknown() -> Self {
        Self { file_id: 0, line: 0, column: 0 }
    }

    pub fn is_unknown(&self) -> bool {
        self.line == 0
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::unknown()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unknown() {
            write!(f, "<unknown>")
        } else {
            write!(f, "{}:{}:{}", self.file_id, self.line, self.column)
        }
    }
}
