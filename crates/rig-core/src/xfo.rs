//! Local transform value (scale, orientation, translation).
//!
//! The builder never does transform math; it only carries the authored value
//! to the host. The components are stored with `nalgebra` types so authoring
//! code can compute poses directly.

use nalgebra::{UnitQuaternion, Vector3};

/// A scale/rotation/translation transform.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Xfo {
    pub tr: Vector3<f64>,
    pub ori: UnitQuaternion<f64>,
    pub sc: Vector3<f64>,
}

impl Xfo {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            tr: Vector3::zeros(),
            ori: UnitQuaternion::identity(),
            sc: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// Identity orientation and scale at the given position.
    pub fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            tr: Vector3::new(x, y, z),
            ..Self::identity()
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }
}

impl Default for Xfo {
    fn default() -> Self {
        Self::identity()
    }
}
