//! # deck-manifest
//!
//! Typed model of the plugin `manifest.json` read by the host application.
//!
//! Keys are PascalCase as the host expects. Optional fields are omitted when
//! unset rather than written as `null`.

mod error;
mod types;
mod validate;

pub use error::ManifestError;
pub use types::*;
pub use validate::ManifestIssue;

/// Parses a manifest from JSON text.
pub fn from_json_str(contents: &str) -> Result<Manifest, ManifestError> {
    Ok(serde_json::from_str(contents)?)
}

/// Serializes a manifest as tab-indented JSON, the layout the host ships with.
pub fn to_pretty_json(manifest: &Manifest) -> Result<String, ManifestError> {
    use serde::Serialize;

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    manifest.serialize(&mut serializer)?;
    String::from_utf8(out).map_err(|e| ManifestError::Encoding(e.to_string()))
}
