//! Geometry for spatial reconstruction.
//!
//! This module provides:
//! - [`rigid`]: planar sensor-to-world rigid transforms
//! - [`angle`]: body-facing angle measurement and correction

pub mod angle;
pub mod rigid;

pub use angle::{body_angle_from_shoulders, correct_body_angle};
pub use rigid::{transform_point, RigidTransform2};
