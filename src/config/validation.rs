//! Config validation error and warning types.
//!
//! Hard range violations abort the run (the input contract was broken
//! upstream); suspicious-but-legal values produce warnings that the caller
//! logs and proceeds past.

use thiserror::Error;

/// Fatal configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} = {value} is out of range (expected {expected})")]
    OutOfRange {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// A non-fatal config warning (suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: &'static str,
    pub message: String,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
