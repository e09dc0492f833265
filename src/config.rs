//! Configuration for batch reconstruction.
//!
//! This module provides [`ReconstructionConfig`], which controls whether body
//! orientations are corrected, how unusable orientations are recognised, and
//! which joint stands for the body position during ingestion.
//!
//! # Example
//!
//! ```
//! use spatial_reconstruction::ReconstructionConfig;
//!
//! // Positions and orientations, legacy sentinel honoured
//! let config = ReconstructionConfig::default();
//!
//! // Positions only, every row survives
//! let positions = ReconstructionConfig::positions_only();
//! assert!(!positions.correct_orientation);
//! ```

use crate::error::{ReconstructionError, Result};

/// Sentinel the capture pipeline writes when no shoulder orientation was found.
pub const LEGACY_ORIENTATION_SENTINEL: f64 = 1.0;

/// Joint used as the body position when none is configured.
pub const DEFAULT_ANCHOR_JOINT: &str = "SpineMid";

/// Configuration for batch reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconstructionConfig {
    /// Append `global_body_angle_deg` and drop rows without a usable orientation.
    pub correct_orientation: bool,

    /// Measured angle that marks "no usable orientation".
    ///
    /// Rows whose measured angle equals this value are treated exactly like
    /// rows with an absent angle. `None` disables the numeric sentinel so that
    /// only explicitly absent angles are dropped.
    pub orientation_sentinel: Option<f64>,

    /// Joint whose position stands for the whole body during ingestion.
    pub anchor_joint: String,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            correct_orientation: true,
            orientation_sentinel: Some(LEGACY_ORIENTATION_SENTINEL),
            anchor_joint: DEFAULT_ANCHOR_JOINT.to_string(),
        }
    }
}

impl ReconstructionConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the sentinel is not finite or the anchor joint is empty.
    pub fn validate(&self) -> Result<()> {
        if let Some(sentinel) = self.orientation_sentinel {
            if !sentinel.is_finite() {
                return Err(ReconstructionError::invalid_config(
                    "orientation_sentinel must be finite",
                ));
            }
        }
        if self.anchor_joint.trim().is_empty() {
            return Err(ReconstructionError::invalid_config(
                "anchor_joint must not be empty",
            ));
        }
        Ok(())
    }

    /// Preset that only maps positions; orientation is left untouched.
    #[must_use]
    pub fn positions_only() -> Self {
        Self {
            correct_orientation: false,
            ..Self::default()
        }
    }

    /// Preset that corrects orientation with the legacy sentinel.
    #[must_use]
    pub fn with_orientation() -> Self {
        Self::default()
    }

    /// Preset for datasets whose ingestion already marks unusable angles as absent.
    ///
    /// A genuine reading of exactly the legacy sentinel survives.
    #[must_use]
    pub fn explicit_marker_only() -> Self {
        Self {
            orientation_sentinel: None,
            ..Self::default()
        }
    }

    /// Enable or disable orientation correction.
    #[must_use]
    pub fn with_orientation_correction(mut self, enabled: bool) -> Self {
        self.correct_orientation = enabled;
        self
    }

    /// Set the numeric sentinel.
    #[must_use]
    pub fn with_sentinel(mut self, sentinel: Option<f64>) -> Self {
        self.orientation_sentinel = sentinel;
        self
    }

    /// Set the anchor joint used during ingestion.
    #[must_use]
    pub fn with_anchor_joint(mut self, joint: impl Into<String>) -> Self {
        self.anchor_joint = joint.into();
        self
    }

    /// Whether a measured angle counts as a usable orientation.
    #[must_use]
    pub fn is_usable_angle(&self, measured_deg: Option<f64>) -> bool {
        match (measured_deg, self.orientation_sentinel) {
            (None, _) => false,
            (Some(angle), Some(sentinel)) => angle != sentinel,
            (Some(_), None) => true,
        }
    }
}
