//! Error types for spatial reconstruction.
//!
//! The core transforms are pure arithmetic and never fail. Errors only arise
//! at the edges: malformed rows, unknown sensors, bad configuration and
//! unparseable input files.

use thiserror::Error;

/// Main error type for spatial reconstruction.
#[derive(Error, Debug)]
pub enum ReconstructionError {
    /// A row is missing a field the core requires.
    #[error("Schema error: row {row} is missing required field `{field}`")]
    MissingField { row: usize, field: &'static str },

    /// A skeleton frame lacks a joint the ingestion needs.
    #[error("Schema error: frame {frame} has no `{joint}` joint")]
    MissingJoint { frame: usize, joint: String },

    /// A row references a sensor with no calibration record.
    #[error("Unknown sensor: no calibration for `{0}`")]
    UnknownSensor(String),

    /// Two calibration records share one sensor id.
    #[error("Duplicate calibration for sensor `{0}`")]
    DuplicateSensor(String),

    /// Input validation errors.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A calibration or frame file could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type alias for spatial reconstruction operations.
pub type Result<T> = std::result::Result<T, ReconstructionError>;

impl ReconstructionError {
    /// Create a missing field (schema) error.
    #[must_use]
    pub const fn missing_field(row: usize, field: &'static str) -> Self {
        Self::MissingField { row, field }
    }

    /// Create a missing joint (schema) error.
    #[must_use]
    pub fn missing_joint(frame: usize, joint: impl Into<String>) -> Self {
        Self::MissingJoint {
            frame,
            joint: joint.into(),
        }
    }

    /// Create an unknown sensor error.
    #[must_use]
    pub fn unknown_sensor(sensor_id: impl Into<String>) -> Self {
        Self::UnknownSensor(sensor_id.into())
    }

    /// Create a duplicate sensor error.
    #[must_use]
    pub fn duplicate_sensor(sensor_id: impl Into<String>) -> Self {
        Self::DuplicateSensor(sensor_id.into())
    }

    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a parse error.
    #[must_use]
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for ReconstructionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
