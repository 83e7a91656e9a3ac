//! Error types for manifest handling.

use thiserror::Error;

/// Errors that can occur when reading or writing a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The manifest is not valid JSON or does not match the model.
    #[error("invalid manifest JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The serialized manifest is not valid UTF-8.
    #[error("manifest encoding error: {0}")]
    Encoding(String),

    /// The manifest parsed but failed validation.
    #[error("manifest validation failed ({count} issue(s))")]
    Invalid { count: usize },
}
