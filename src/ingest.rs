//! Conversion of exported skeleton frames into observation rows.
//!
//! The capture application writes one JSON array per sensor session. Each
//! element is a tracked body at one instant:
//!
//! ```json
//! {
//!   "CameraId": "kinect_2",
//!   "Timestamp": "2024-05-21T10:31:07.512",
//!   "BodyId": 72057594037930241,
//!   "Joints": {
//!     "SpineMid": { "X": 0.12, "Y": 0.31, "Z": 2.05, "TrackingState": "Tracked" },
//!     "ShoulderLeft": { "X": -0.09, "Y": 0.52, "Z": 2.11, "TrackingState": "Tracked" }
//!   }
//! }
//! ```
//!
//! Camera space is right-handed with `Z` pointing away from the sensor, so a
//! top view uses `X` sideways and `Z` as depth.

use std::collections::BTreeMap;

use log::debug;
use nalgebra::Point3;

use crate::calibration::CalibrationStore;
use crate::config::ReconstructionConfig;
use crate::error::{ReconstructionError, Result};
use crate::math::angle::body_angle_from_shoulders;
use crate::observation::{Dataset, Observation};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Left shoulder joint name.
pub const SHOULDER_LEFT: &str = "ShoulderLeft";

/// Right shoulder joint name.
pub const SHOULDER_RIGHT: &str = "ShoulderRight";

/// Passthrough column holding the anchor joint's tracking state.
pub const TRACKING_STATE_COLUMN: &str = "tracking_state";

/// One joint position in sensor camera space (meters).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct JointSample {
    /// Sideways.
    pub x: f64,
    /// Height.
    pub y: f64,
    /// Depth.
    pub z: f64,
    /// Sensor-reported tracking state, e.g. `Tracked` or `Inferred`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tracking_state: String,
}

impl JointSample {
    /// Joint position as a point.
    #[must_use]
    pub fn position(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }
}

/// One tracked body at one instant, as exported by a sensor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct SkeletonFrame {
    /// Sensor identifier.
    pub camera_id: String,
    /// Capture time as written by the sensor host.
    pub timestamp: String,
    /// Sensor tracking id of the body.
    pub body_id: u64,
    /// Joints keyed by joint type name.
    pub joints: BTreeMap<String, JointSample>,
}

impl SkeletonFrame {
    /// Measured body-facing angle from the shoulder joints, if both exist.
    #[must_use]
    pub fn body_angle(&self) -> Option<f64> {
        let left = self.joints.get(SHOULDER_LEFT)?;
        let right = self.joints.get(SHOULDER_RIGHT)?;
        body_angle_from_shoulders(&left.position(), &right.position())
    }
}

/// Parse an exported JSON array of skeleton frames.
///
/// # Errors
///
/// Returns a parse error for malformed JSON.
#[cfg(feature = "serde")]
pub fn parse_frames(json: &str) -> Result<Vec<SkeletonFrame>> {
    Ok(serde_json::from_str(json)?)
}

/// Read an exported JSON array of skeleton frames.
///
/// # Errors
///
/// Returns a parse error for unreadable or malformed input.
#[cfg(feature = "serde")]
pub fn read_frames<R: std::io::Read>(reader: R) -> Result<Vec<SkeletonFrame>> {
    Ok(serde_json::from_reader(reader)?)
}

/// Turn frames into uncalibrated observation rows, one per frame.
///
/// The body is positioned at `config.anchor_joint`; its `X` becomes
/// `local_x` and its `Z` becomes `local_y`. Sample indices follow input
/// order. A missing shoulder leaves the measured angle absent.
///
/// # Errors
///
/// Returns an error for an invalid configuration or a frame without the
/// anchor joint.
pub fn frames_to_observations(
    frames: &[SkeletonFrame],
    config: &ReconstructionConfig,
) -> Result<Dataset> {
    config.validate()?;

    let mut dataset = Dataset::new();
    for (index, frame) in frames.iter().enumerate() {
        let anchor = frame
            .joints
            .get(&config.anchor_joint)
            .ok_or_else(|| ReconstructionError::missing_joint(index, &config.anchor_joint))?;

        let mut observation = Observation::new(frame.camera_id.clone(), anchor.x, anchor.z)
            .with_subject(frame.body_id.to_string())
            .with_sample_index(index)
            .with_body_angle(frame.body_angle())
            .with_extra(TRACKING_STATE_COLUMN, anchor.tracking_state.clone());
        observation.timestamp = Some(frame.timestamp.clone());
        observation.joint = Some(config.anchor_joint.clone());

        dataset.push(observation);
    }

    debug!(
        "ingested {} frames anchored at {}",
        dataset.len(),
        config.anchor_joint
    );
    Ok(dataset)
}

/// Turn frames into observation rows with their calibration joined.
///
/// # Errors
///
/// As [`frames_to_observations`], plus an unknown sensor error for frames
/// from a sensor missing in `store`.
pub fn ingest_frames(
    frames: &[SkeletonFrame],
    store: &CalibrationStore,
    config: &ReconstructionConfig,
) -> Result<Dataset> {
    let mut dataset = frames_to_observations(frames, config)?;
    store.join(&mut dataset)?;
    Ok(dataset)
}
