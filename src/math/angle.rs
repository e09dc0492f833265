//! Body-facing angles.
//!
//! A sensor measures how a body faces relative to itself; the sensor's own
//! calibration rotation then references that angle to the world frame.

use nalgebra::Point3;

/// Reference a locally measured body angle to the world frame.
///
/// Computes `rotation_deg - measured_body_angle_deg`. Non-finite inputs
/// propagate.
///
/// # Example
///
/// ```
/// use spatial_reconstruction::correct_body_angle;
///
/// assert_eq!(correct_body_angle(30.0, 10.0), 20.0);
/// assert_eq!(correct_body_angle(-15.0, 5.0), -20.0);
/// ```
#[must_use]
#[inline]
pub fn correct_body_angle(rotation_deg: f64, measured_body_angle_deg: f64) -> f64 {
    rotation_deg - measured_body_angle_deg
}

/// Body-facing angle in degrees from the two shoulder joints.
///
/// Joints are in sensor camera space, seen from above: `x` runs sideways and
/// `z` is depth. The angle of the shoulder line is turned a quarter towards
/// the side the body faces and rounded to whole degrees, matching what the
/// capture application records.
///
/// Returns `None` when the shoulders coincide in the top view.
#[must_use]
pub fn body_angle_from_shoulders(left: &Point3<f64>, right: &Point3<f64>) -> Option<f64> {
    let dx = right.x - left.x;
    let dz = right.z - left.z;

    let line_deg = round_to((dz / dx).atan().to_degrees(), 2);
    if !line_deg.is_finite() {
        return None;
    }

    let facing = if right.x < left.x {
        line_deg - 90.0
    } else {
        line_deg + 90.0
    };

    Some(facing.round_ties_even())
}

/// Round half to even at `decimals` places.
fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}
