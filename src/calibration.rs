//! Sensor extrinsic calibration.
//!
//! Each physical sensor has one [`SensorCalibration`]: where it stands in the
//! world frame and how far it is turned. A [`CalibrationStore`] holds the
//! records for a recording session and joins them onto observation rows.
//!
//! # Example
//!
//! ```
//! use spatial_reconstruction::{CalibrationStore, Dataset, Observation, SensorCalibration};
//!
//! let store = CalibrationStore::from_records([
//!     SensorCalibration::new("k1", 0.0, 0.0, 0.0),
//!     SensorCalibration::new("k2", 4.0, 0.0, 180.0),
//! ])?;
//!
//! let mut dataset = Dataset::from_rows(vec![Observation::new("k2", 1.0, 2.0)]);
//! store.join(&mut dataset)?;
//! assert!(dataset.rows()[0].is_calibrated());
//! # Ok::<(), spatial_reconstruction::ReconstructionError>(())
//! ```

use std::collections::BTreeMap;

use log::debug;

use crate::error::{ReconstructionError, Result};
use crate::math::rigid::RigidTransform2;
use crate::observation::Dataset;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Position and rotation of one sensor in the world frame.
///
/// Rotation is in degrees and may be negative or exceed 360.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorCalibration {
    /// Sensor identifier as it appears on observation rows.
    #[cfg_attr(feature = "serde", serde(alias = "kinect_id"))]
    pub sensor_id: String,

    /// World x of the sensor.
    #[cfg_attr(feature = "serde", serde(alias = "Kx"))]
    pub origin_x: f64,

    /// World y of the sensor.
    #[cfg_attr(feature = "serde", serde(alias = "Ky"))]
    pub origin_y: f64,

    /// Sensor rotation in degrees.
    #[cfg_attr(feature = "serde", serde(alias = "rotation"))]
    pub rotation_deg: f64,
}

impl SensorCalibration {
    /// Create a calibration record.
    #[must_use]
    pub fn new(sensor_id: impl Into<String>, origin_x: f64, origin_y: f64, rotation_deg: f64) -> Self {
        Self {
            sensor_id: sensor_id.into(),
            origin_x,
            origin_y,
            rotation_deg,
        }
    }

    /// A sensor placed at the world origin with no rotation.
    #[must_use]
    pub fn identity(sensor_id: impl Into<String>) -> Self {
        Self::new(sensor_id, 0.0, 0.0, 0.0)
    }

    /// The local-to-world transform of this sensor.
    #[must_use]
    pub const fn transform(&self) -> RigidTransform2 {
        RigidTransform2::new(self.origin_x, self.origin_y, self.rotation_deg)
    }
}

/// Calibration records keyed by sensor id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalibrationStore {
    sensors: BTreeMap<String, SensorCalibration>,
}

impl CalibrationStore {
    /// Create an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sensors: BTreeMap::new(),
        }
    }

    /// Build a store from records.
    ///
    /// # Errors
    ///
    /// Returns an error if two records share a sensor id.
    pub fn from_records<I>(records: I) -> Result<Self>
    where
        I: IntoIterator<Item = SensorCalibration>,
    {
        let mut store = Self::new();
        for record in records {
            store.insert(record)?;
        }
        Ok(store)
    }

    /// Parse a JSON array of calibration records.
    ///
    /// Field names `sensor_id`, `origin_x`, `origin_y`, `rotation_deg` are
    /// expected; the legacy spreadsheet names `kinect_id`, `Kx`, `Ky` and
    /// `rotation` are accepted too.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed JSON, or a duplicate sensor error.
    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<SensorCalibration> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Read a JSON array of calibration records.
    ///
    /// # Errors
    ///
    /// Returns a parse error for unreadable or malformed input.
    #[cfg(feature = "serde")]
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let records: Vec<SensorCalibration> = serde_json::from_reader(reader)?;
        Self::from_records(records)
    }

    /// Add a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the sensor id is empty or already present.
    pub fn insert(&mut self, record: SensorCalibration) -> Result<()> {
        if record.sensor_id.is_empty() {
            return Err(ReconstructionError::invalid_input(
                "calibration record has an empty sensor_id",
            ));
        }
        if self.sensors.contains_key(&record.sensor_id) {
            return Err(ReconstructionError::duplicate_sensor(record.sensor_id));
        }
        self.sensors.insert(record.sensor_id.clone(), record);
        Ok(())
    }

    /// Look up a sensor.
    #[must_use]
    pub fn get(&self, sensor_id: &str) -> Option<&SensorCalibration> {
        self.sensors.get(sensor_id)
    }

    /// Look up a sensor that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`ReconstructionError::UnknownSensor`] if it is missing.
    pub fn require(&self, sensor_id: &str) -> Result<&SensorCalibration> {
        self.get(sensor_id)
            .ok_or_else(|| ReconstructionError::unknown_sensor(sensor_id))
    }

    /// Number of sensors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// Whether the store holds no sensors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Iterate records ordered by sensor id.
    pub fn iter(&self) -> impl Iterator<Item = &SensorCalibration> {
        self.sensors.values()
    }

    /// Copy each row's sensor calibration onto the row.
    ///
    /// Existing calibration fields are overwritten so that the derived world
    /// coordinates always follow the current records.
    ///
    /// # Errors
    ///
    /// Returns [`ReconstructionError::UnknownSensor`] for the first row whose
    /// sensor has no record. The dataset is left untouched in that case.
    pub fn join(&self, dataset: &mut Dataset) -> Result<()> {
        let calibrations = dataset
            .iter()
            .map(|row| self.require(&row.sensor_id))
            .collect::<Result<Vec<_>>>()?;

        for (row, calibration) in dataset.rows_mut().iter_mut().zip(calibrations) {
            row.origin_x = Some(calibration.origin_x);
            row.origin_y = Some(calibration.origin_y);
            row.rotation_deg = Some(calibration.rotation_deg);
        }
        debug!(
            "joined {} sensor calibrations onto {} rows",
            self.len(),
            dataset.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observation::Observation;

    fn two_sensors() -> CalibrationStore {
        CalibrationStore::from_records([
            SensorCalibration::new("k1", 1.0, 2.0, 30.0),
            SensorCalibration::new("k2", -3.0, 0.5, -120.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup() {
        let store = two_sensors();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("k1").unwrap().rotation_deg, 30.0);
        assert!(store.get("k9").is_none());
        assert!(matches!(
            store.require("k9"),
            Err(ReconstructionError::UnknownSensor(id)) if id == "k9"
        ));
    }

    #[test]
    fn test_duplicate_rejected() {
        let result = CalibrationStore::from_records([
            SensorCalibration::identity("k1"),
            SensorCalibration::identity("k1"),
        ]);
        assert!(matches!(result, Err(ReconstructionError::DuplicateSensor(_))));
    }

    #[test]
    fn test_empty_id_rejected() {
        let mut store = CalibrationStore::new();
        assert!(store.insert(SensorCalibration::identity("")).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_transform() {
        let t = SensorCalibration::new("k1", 1.0, 2.0, 30.0).transform();
        assert_eq!(t, RigidTransform2::new(1.0, 2.0, 30.0));
    }

    #[test]
    fn test_join() {
        let store = two_sensors();
        let mut dataset = Dataset::from_rows(vec![
            Observation::new("k2", 0.0, 1.0),
            Observation::new("k1", 0.0, 1.0).with_origin(9.0, 9.0, 9.0),
        ]);

        store.join(&mut dataset).unwrap();

        let rows = dataset.rows();
        assert_eq!(rows[0].origin_x, Some(-3.0));
        assert_eq!(rows[0].rotation_deg, Some(-120.0));
        assert_eq!(rows[1].origin_y, Some(2.0));
        assert_eq!(rows[1].rotation_deg, Some(30.0));
    }

    #[test]
    fn test_join_unknown_sensor() {
        let store = two_sensors();
        let mut dataset = Dataset::from_rows(vec![
            Observation::new("k1", 0.0, 0.0),
            Observation::new("k2", 1.0, 0.0).with_origin(9.0, 9.0, 9.0),
            Observation::new("k3", 0.0, 0.0),
        ]);
        let before = dataset.clone();

        assert!(matches!(
            store.join(&mut dataset),
            Err(ReconstructionError::UnknownSensor(id)) if id == "k3"
        ));
        assert_eq!(dataset, before);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_from_json() {
        let json = r#"[
            {"sensor_id": "k1", "origin_x": 0.0, "origin_y": 0.0, "rotation_deg": 0.0},
            {"kinect_id": "k2", "Kx": 3.5, "Ky": 1.25, "rotation": -90}
        ]"#;
        let store = CalibrationStore::from_json_str(json).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.get("k2"),
            Some(&SensorCalibration::new("k2", 3.5, 1.25, -90.0))
        );

        assert!(matches!(
            CalibrationStore::from_json_str("[{\"sensor_id\": 1}]"),
            Err(ReconstructionError::Parse(_))
        ));
    }
}
