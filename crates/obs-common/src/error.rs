//! Error types for the observation data-access layer.

use thiserror::Error;

use crate::envelope::EnvelopeParseError;
use crate::time::TimeParseError;

/// Result type alias using ObsError.
pub type ObsResult<T> = Result<T, ObsError>;

/// Primary error type for observation data access.
#[derive(Debug, Error)]
pub enum ObsError {
    // === Lookup Errors ===
    #[error("No value converter registered for type '{0}'")]
    UnknownType(String),

    #[error("Malformed {dimension} identifier: '{value}'")]
    MalformedIdentifier { dimension: String, value: String },

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Data Integrity Errors ===
    #[error("Observation {observation} has no sampling time end")]
    MissingRequiredTimestamp { observation: i64 },

    // === Infrastructure Errors ===
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ObsError {
    /// Whether the caller may recover locally (degrade or return "no match")
    /// instead of surfacing the error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ObsError::UnknownType(_)
                | ObsError::MalformedIdentifier { .. }
                | ObsError::NotFound(_)
        )
    }

    /// Get the HTTP status code an API layer should answer with.
    pub fn http_status_code(&self) -> u16 {
        match self {
            ObsError::InvalidParameter { .. } | ObsError::MalformedIdentifier { .. } => 400,
            ObsError::NotFound(_) | ObsError::UnknownType(_) => 404,
            _ => 500,
        }
    }
}

impl From<EnvelopeParseError> for ObsError {
    fn from(err: EnvelopeParseError) -> Self {
        ObsError::InvalidParameter {
            param: "bbox".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<TimeParseError> for ObsError {
    fn from(err: TimeParseError) -> Self {
        ObsError::InvalidParameter {
            param: "timespan".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ObsError {
    fn from(err: serde_json::Error) -> Self {
        ObsError::Storage(format!("JSON error: {}", err))
    }
}
