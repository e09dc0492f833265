//! Observation rows and datasets.
//!
//! An [`Observation`] is one skeleton sample as reported by one sensor, in
//! that sensor's local frame, with the sensor's calibration joined onto the
//! row. A [`GlobalObservation`] keeps every original column and appends the
//! world-frame fields derived from it.

use std::collections::BTreeMap;

use crate::calibration::SensorCalibration;
use crate::error::{ReconstructionError, Result};
use crate::math::rigid::RigidTransform2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One skeleton sample in its sensor's local frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Observation {
    /// Sensor that reported the sample.
    pub sensor_id: String,

    /// Tracked person, if known. Passed through untouched.
    #[cfg_attr(feature = "serde", serde(default))]
    pub subject_id: Option<String>,

    /// Position of the sample in the ingested stream.
    #[cfg_attr(feature = "serde", serde(default))]
    pub sample_index: usize,

    /// Capture time as recorded by the sensor host.
    #[cfg_attr(feature = "serde", serde(default))]
    pub timestamp: Option<String>,

    /// Joint the position was taken from.
    #[cfg_attr(feature = "serde", serde(default))]
    pub joint: Option<String>,

    /// Sideways position in the sensor frame.
    pub local_x: f64,

    /// Depth position in the sensor frame.
    pub local_y: f64,

    /// Sensor origin x, joined from the calibration.
    #[cfg_attr(feature = "serde", serde(default))]
    pub origin_x: Option<f64>,

    /// Sensor origin y, joined from the calibration.
    #[cfg_attr(feature = "serde", serde(default))]
    pub origin_y: Option<f64>,

    /// Sensor rotation in degrees, joined from the calibration.
    #[cfg_attr(feature = "serde", serde(default))]
    pub rotation_deg: Option<f64>,

    /// Body-facing angle measured by the sensor; `None` when unusable.
    ///
    /// The column must be present when deserializing; `null` marks an
    /// unusable angle.
    #[cfg_attr(feature = "serde", serde(deserialize_with = "required_nullable"))]
    pub measured_body_angle_deg: Option<f64>,

    /// Any further columns carried along for downstream analysis.
    #[cfg_attr(feature = "serde", serde(default))]
    pub extra: BTreeMap<String, String>,
}

impl Observation {
    /// Create a sample with only its sensor and local position set.
    #[must_use]
    pub fn new(sensor_id: impl Into<String>, local_x: f64, local_y: f64) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            subject_id: None,
            sample_index: 0,
            timestamp: None,
            joint: None,
            local_x,
            local_y,
            origin_x: None,
            origin_y: None,
            rotation_deg: None,
            measured_body_angle_deg: None,
            extra: BTreeMap::new(),
        }
    }

    /// Set the sensor origin and rotation on this row.
    #[must_use]
    pub fn with_origin(mut self, origin_x: f64, origin_y: f64, rotation_deg: f64) -> Self {
        self.origin_x = Some(origin_x);
        self.origin_y = Some(origin_y);
        self.rotation_deg = Some(rotation_deg);
        self
    }

    /// Copy a calibration record onto this row.
    #[must_use]
    pub fn with_calibration(self, calibration: &SensorCalibration) -> Self {
        self.with_origin(
            calibration.origin_x,
            calibration.origin_y,
            calibration.rotation_deg,
        )
    }

    /// Set the measured body angle.
    #[must_use]
    pub fn with_body_angle(mut self, measured_deg: Option<f64>) -> Self {
        self.measured_body_angle_deg = measured_deg;
        self
    }

    /// Set the subject id.
    #[must_use]
    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }

    /// Set the sample index.
    #[must_use]
    pub fn with_sample_index(mut self, index: usize) -> Self {
        self.sample_index = index;
        self
    }

    /// Add a passthrough column.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Whether the calibration fields are present.
    #[must_use]
    pub const fn is_calibrated(&self) -> bool {
        self.origin_x.is_some() && self.origin_y.is_some() && self.rotation_deg.is_some()
    }

    /// The sensor transform carried on this row.
    ///
    /// # Errors
    ///
    /// Returns a schema error naming `row` and the first missing field.
    pub fn transform(&self, row: usize) -> Result<RigidTransform2> {
        let origin_x = self
            .origin_x
            .ok_or(ReconstructionError::missing_field(row, "origin_x"))?;
        let origin_y = self
            .origin_y
            .ok_or(ReconstructionError::missing_field(row, "origin_y"))?;
        let rotation_deg = self
            .rotation_deg
            .ok_or(ReconstructionError::missing_field(row, "rotation_deg"))?;
        Ok(RigidTransform2::new(origin_x, origin_y, rotation_deg))
    }
}

/// Deserialize an `Option` whose key must exist, with `null` as `None`.
#[cfg(feature = "serde")]
fn required_nullable<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer)
}

/// An observation with its world-frame fields appended.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GlobalObservation {
    /// All original columns, unchanged.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub observation: Observation,

    /// World x.
    pub global_x: f64,

    /// World y.
    pub global_y: f64,

    /// World-referenced body angle; `None` when orientation was not corrected.
    pub global_body_angle_deg: Option<f64>,
}

/// Ordered collection of observations.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Dataset {
    rows: Vec<Observation>,
}

impl Dataset {
    /// Create an empty dataset.
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Wrap existing rows, keeping their order.
    #[must_use]
    pub const fn from_rows(rows: Vec<Observation>) -> Self {
        Self { rows }
    }

    /// Append a row.
    pub fn push(&mut self, observation: Observation) {
        self.rows.push(observation);
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in order.
    #[must_use]
    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    /// Mutable rows in order.
    pub fn rows_mut(&mut self) -> &mut [Observation] {
        &mut self.rows
    }

    /// Iterate rows in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.rows.iter()
    }

    /// Consume the dataset into its rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<Observation> {
        self.rows
    }
}

impl FromIterator<Observation> for Dataset {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Dataset {
    type Item = Observation;
    type IntoIter = std::vec::IntoIter<Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
