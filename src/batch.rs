//! Batch reconstruction of a dataset into the world frame.
//!
//! [`reconstruct`] is the entry point used by ingestion and analysis code.
//! Every row is mapped independently:
//!
//! 1. Read the sensor transform joined onto the row (schema error if absent)
//! 2. Map `(local_x, local_y)` to `(global_x, global_y)`
//! 3. If orientation correction is on, drop rows without a usable measured
//!    angle and reference the rest to the world frame
//!
//! Surviving rows keep their input order and all their original columns.

use std::collections::BTreeMap;

use log::{debug, trace, warn};

use crate::config::ReconstructionConfig;
use crate::error::Result;
use crate::math::angle::correct_body_angle;
use crate::observation::{Dataset, GlobalObservation, Observation};

/// Result of a batch reconstruction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconstructedDataset {
    /// Surviving rows in input order.
    pub rows: Vec<GlobalObservation>,

    /// Number of rows handed in.
    pub input_rows: usize,

    /// Rows dropped for lacking a usable orientation.
    pub dropped_rows: usize,
}

impl ReconstructedDataset {
    /// Number of surviving rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether no rows survived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate surviving rows in order.
    pub fn iter(&self) -> std::slice::Iter<'_, GlobalObservation> {
        self.rows.iter()
    }

    /// Surviving rows per sensor.
    #[must_use]
    pub fn rows_per_sensor(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for row in &self.rows {
            *counts.entry(row.observation.sensor_id.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

/// Map every row of `dataset` into the world frame.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, or a schema error for
/// the first row that lacks its calibration fields. Non-finite coordinates
/// are not errors; they propagate into the output.
///
/// # Example
///
/// ```
/// use spatial_reconstruction::{reconstruct, Dataset, Observation, ReconstructionConfig};
///
/// let dataset = Dataset::from_rows(vec![
///     Observation::new("k1", 1.0, 0.0)
///         .with_origin(5.0, 5.0, 90.0)
///         .with_body_angle(Some(10.0)),
///     Observation::new("k1", 2.0, 0.0)
///         .with_origin(5.0, 5.0, 90.0)
///         .with_body_angle(Some(1.0)),
/// ]);
///
/// let out = reconstruct(&dataset, &ReconstructionConfig::default())?;
/// assert_eq!(out.len(), 1);
/// assert_eq!(out.dropped_rows, 1);
/// assert_eq!(out.rows[0].global_body_angle_deg, Some(80.0));
/// # Ok::<(), spatial_reconstruction::ReconstructionError>(())
/// ```
pub fn reconstruct(
    dataset: &Dataset,
    config: &ReconstructionConfig,
) -> Result<ReconstructedDataset> {
    config.validate()?;

    let mut rows = Vec::with_capacity(dataset.len());
    let mut dropped_rows = 0;

    for (index, observation) in dataset.iter().enumerate() {
        match reconstruct_row(index, observation, config)? {
            Some(row) => rows.push(row),
            None => {
                trace!(
                    "row {index} (sensor {}) dropped: no usable body orientation",
                    observation.sensor_id
                );
                dropped_rows += 1;
            }
        }
    }

    if dropped_rows > 0 {
        warn!(
            "{dropped_rows} of {} rows dropped for unusable body orientation",
            dataset.len()
        );
    }
    debug!(
        "reconstructed {} rows into the world frame (orientation correction: {})",
        rows.len(),
        config.correct_orientation
    );

    Ok(ReconstructedDataset {
        rows,
        input_rows: dataset.len(),
        dropped_rows,
    })
}

/// Map positions only; every row survives.
///
/// # Errors
///
/// Returns a schema error for the first row without calibration fields.
pub fn reconstruct_positions(dataset: &Dataset) -> Result<ReconstructedDataset> {
    reconstruct(dataset, &ReconstructionConfig::positions_only())
}

/// Map a single row.
///
/// Returns `Ok(None)` when orientation correction is on and the row has no
/// usable measured angle.
///
/// # Errors
///
/// Returns a schema error naming `index` if calibration fields are missing.
pub fn reconstruct_row(
    index: usize,
    observation: &Observation,
    config: &ReconstructionConfig,
) -> Result<Option<GlobalObservation>> {
    let transform = observation.transform(index)?;
    let (global_x, global_y) = transform.apply(observation.local_x, observation.local_y);

    let global_body_angle_deg = if config.correct_orientation {
        match observation.measured_body_angle_deg {
            Some(measured) if config.is_usable_angle(Some(measured)) => {
                Some(correct_body_angle(transform.rotation_deg, measured))
            }
            _ => return Ok(None),
        }
    } else {
        None
    };

    Ok(Some(GlobalObservation {
        observation: observation.clone(),
        global_x,
        global_y,
        global_body_angle_deg,
    }))
}
