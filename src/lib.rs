//! Spatial Reconstruction Library
//!
//! Unifies skeleton samples captured by several fixed depth sensors into one
//! shared world frame.
//!
//! Every sensor is mounted at a known world position and rotation. A sample
//! it reports lives in that sensor's local top-view frame (`x` sideways,
//! `y` depth) and must be rotated and translated before samples from
//! different sensors can be compared.
//!
//! # Features
//!
//! - **Rigid transforms**: one homogeneous 3x3 matrix per sensor
//! - **Orientation correction**: body-facing angles referenced to the world
//! - **Batch reconstruction**: order-preserving, row-independent mapping with
//!   unusable orientations filtered out
//! - **Ingestion**: exported skeleton frames and calibration records (JSON)
//!
//! # Quick Start
//!
//! ```
//! use spatial_reconstruction::{
//!     reconstruct, CalibrationStore, Dataset, Observation, ReconstructionConfig,
//!     SensorCalibration,
//! };
//!
//! let store = CalibrationStore::from_records([
//!     SensorCalibration::new("kinect_1", 0.0, 0.0, 0.0),
//!     SensorCalibration::new("kinect_2", 5.0, 5.0, 90.0),
//! ])?;
//!
//! let mut dataset = Dataset::from_rows(vec![
//!     Observation::new("kinect_1", 1.0, 2.0).with_body_angle(Some(30.0)),
//!     Observation::new("kinect_2", 1.0, 0.0).with_body_angle(Some(10.0)),
//! ]);
//! store.join(&mut dataset)?;
//!
//! let world = reconstruct(&dataset, &ReconstructionConfig::default())?;
//! let second = &world.rows[1];
//! assert!((second.global_x - 5.0).abs() < 1e-9);
//! assert!((second.global_y - 6.0).abs() < 1e-9);
//! assert_eq!(second.global_body_angle_deg, Some(80.0));
//! # Ok::<(), spatial_reconstruction::ReconstructionError>(())
//! ```
//!
//! # Unusable orientations
//!
//! The capture pipeline writes `1` as the body angle when it could not find
//! both shoulders. With orientation correction on, such rows (and rows whose
//! angle is absent) are dropped from the output. See
//! [`ReconstructionConfig::orientation_sentinel`].

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]

pub mod batch;
pub mod calibration;
pub mod config;
pub mod error;
pub mod ingest;
pub mod math;
pub mod observation;

// Re-exports for convenient access
pub use batch::{reconstruct, reconstruct_positions, reconstruct_row, ReconstructedDataset};
pub use calibration::{CalibrationStore, SensorCalibration};
pub use config::{ReconstructionConfig, DEFAULT_ANCHOR_JOINT, LEGACY_ORIENTATION_SENTINEL};
pub use error::{ReconstructionError, Result};
pub use ingest::{frames_to_observations, ingest_frames, JointSample, SkeletonFrame};
#[cfg(feature = "serde")]
pub use ingest::{parse_frames, read_frames};
pub use math::{body_angle_from_shoulders, correct_body_angle, transform_point, RigidTransform2};
pub use observation::{Dataset, GlobalObservation, Observation};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> CalibrationStore {
        CalibrationStore::from_records([
            SensorCalibration::new("k1", 0.0, 0.0, 0.0),
            SensorCalibration::new("k2", 6.0, 0.0, 180.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_full_pipeline() {
        // The same person seen by two sensors facing each other
        let mut dataset = Dataset::from_rows(vec![
            Observation::new("k1", 0.0, 3.0).with_body_angle(Some(90.0)),
            Observation::new("k2", 6.0, -3.0).with_body_angle(Some(-90.0)),
        ]);
        session().join(&mut dataset).unwrap();

        let world = reconstruct(&dataset, &ReconstructionConfig::default()).unwrap();
        assert_eq!(world.len(), 2);

        let (a, b) = (&world.rows[0], &world.rows[1]);
        assert!((a.global_x - b.global_x).abs() < 1e-9);
        assert!((a.global_y - b.global_y).abs() < 1e-9);
    }

    #[test]
    fn test_reconstruction_is_deterministic() {
        let mut dataset: Dataset = (0..50)
            .map(|i| {
                let t = f64::from(i) * 0.1;
                Observation::new(if i % 2 == 0 { "k1" } else { "k2" }, t.cos(), t.sin())
                    .with_body_angle(Some(f64::from(i)))
            })
            .collect();
        session().join(&mut dataset).unwrap();

        let config = ReconstructionConfig::default();
        let first = reconstruct(&dataset, &config).unwrap();
        let second = reconstruct(&dataset, &config).unwrap();

        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.global_x.to_bits(), b.global_x.to_bits());
            assert_eq!(a.global_y.to_bits(), b.global_y.to_bits());
            assert_eq!(a.global_body_angle_deg, b.global_body_angle_deg);
        }
        // angle 1 is the sentinel
        assert_eq!(first.dropped_rows, 1);
    }
}
