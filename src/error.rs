//! Error types for explanation derivation.

use thiserror::Error;

/// Errors raised while turning raw engine telemetry into an explanation.
///
/// Only structurally required telemetry is rejected. Optional sub-fields fall
/// back to their documented defaults and never reach this type.
#[derive(Error, Debug)]
pub enum ExplainError {
    /// A required top-level telemetry section is absent.
    #[error("missing required telemetry section: {0}")]
    MissingSection(&'static str),

    /// A required field inside a telemetry record is absent.
    #[error("missing field {field} in {section}")]
    MissingField { section: String, field: String },

    /// A field is present but carries the wrong JSON type.
    #[error("invalid field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    /// The match level code is not part of the engine vocabulary.
    #[error("unknown match level code: {0}")]
    UnknownMatchLevel(String),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for explanation derivation.
pub type Result<T> = std::result::Result<T, ExplainError>;
