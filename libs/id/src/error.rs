//! Error types for ID parsing and validation.

use thiserror::Error;

/// Errors that can occur when parsing or validating IDs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The ID string is empty.
    #[error("{kind} cannot be empty")]
    Empty { kind: &'static str },

    /// The ID contains only whitespace.
    #[error("{kind} cannot be blank")]
    Blank { kind: &'static str },
}

impl IdError {
    /// Returns true if this error indicates the input was empty or blank.
    pub fn is_empty(&self) -> bool {
        matches!(self, IdError::Empty { .. } | IdError::Blank { .. })
    }

    /// Returns the kind of ID that failed to parse.
    pub fn kind(&self) -> &'static str {
        match self {
            IdError::Empty { kind } | IdError::Blank { kind } => kind,
        }
    }
}
