//! Planar rigid-body transforms between a sensor frame and the world frame.
//!
//! A sensor mounted at `(origin_x, origin_y)` and turned by `rotation_deg`
//! maps a local point `p` to the world as `T · [p, 1]` with
//!
//! ```text
//! T = | cos θ  -sin θ  origin_x |
//!     | sin θ   cos θ  origin_y |
//!     |   0       0       1     |
//! ```
//!
//! No input validation is performed: non-finite inputs produce non-finite
//! outputs, which downstream filtering relies on.

use nalgebra::{Matrix3, Point2, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Rotation plus translation in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RigidTransform2 {
    /// World x of the sensor origin.
    pub origin_x: f64,
    /// World y of the sensor origin.
    pub origin_y: f64,
    /// Sensor rotation in degrees; any real value is accepted.
    pub rotation_deg: f64,
}

impl Default for RigidTransform2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl RigidTransform2 {
    /// Create a transform from an origin and a rotation in degrees.
    #[must_use]
    pub const fn new(origin_x: f64, origin_y: f64, rotation_deg: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            rotation_deg,
        }
    }

    /// The transform that leaves every point in place.
    #[must_use]
    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Homogeneous 3x3 matrix of this transform.
    #[must_use]
    pub fn matrix(&self) -> Matrix3<f64> {
        let (sin, cos) = self.rotation_deg.to_radians().sin_cos();
        Matrix3::new(
            cos, -sin, self.origin_x, //
            sin, cos, self.origin_y, //
            0.0, 0.0, 1.0,
        )
    }

    /// Map a local point into the world frame.
    #[must_use]
    pub fn apply(&self, local_x: f64, local_y: f64) -> (f64, f64) {
        let global = self.matrix() * Vector3::new(local_x, local_y, 1.0);
        (global.x, global.y)
    }

    /// Map a local point into the world frame.
    #[must_use]
    pub fn apply_point(&self, local: &Point2<f64>) -> Point2<f64> {
        let (x, y) = self.apply(local.x, local.y);
        Point2::new(x, y)
    }

    /// Map a world point back into this sensor's local frame.
    ///
    /// The rotation block is orthonormal, so its inverse is its transpose.
    #[must_use]
    pub fn inverse_apply(&self, global_x: f64, global_y: f64) -> (f64, f64) {
        let (sin, cos) = self.rotation_deg.to_radians().sin_cos();
        let dx = global_x - self.origin_x;
        let dy = global_y - self.origin_y;
        (cos * dx + sin * dy, -sin * dx + cos * dy)
    }
}

/// Transform a local sensor point into world coordinates.
///
/// # Arguments
///
/// * `local_x`, `local_y` - Point in the sensor frame
/// * `origin_x`, `origin_y` - Sensor position in the world frame
/// * `rotation_deg` - Sensor rotation in degrees (negative and >360 accepted)
///
/// # Example
///
/// ```
/// use spatial_reconstruction::transform_point;
///
/// let (x, y) = transform_point(1.0, 0.0, 5.0, 5.0, 90.0);
/// assert!((x - 5.0).abs() < 1e-9);
/// assert!((y - 6.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn transform_point(
    local_x: f64,
    local_y: f64,
    origin_x: f64,
    origin_y: f64,
    rotation_deg: f64,
) -> (f64, f64) {
    RigidTransform2::new(origin_x, origin_y, rotation_deg).apply(local_x, local_y)
}
