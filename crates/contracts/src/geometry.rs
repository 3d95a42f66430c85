//! Geometry primitives
//!
//! Plain serde-friendly vectors, quaternions and poses. Arithmetic is delegated
//! to nalgebra; these types only exist so the wire/record model stays flat.

use nalgebra::{Quaternion as NaQuaternion, UnitQuaternion};
use serde::{Deserialize, Serialize};

/// 3D 向量
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// True when any component is NaN
    pub fn has_nan(&self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Vector3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Quaternion (x, y, z, w)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quaternion {
    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Rotation from static-axis roll/pitch/yaw (radians)
    pub fn from_euler(roll: f64, pitch: f64, yaw: f64) -> Self {
        UnitQuaternion::from_euler_angles(roll, pitch, yaw).into()
    }

    /// Algebraic inverse `conj(q) / |q|²`, re-normalized.
    ///
    /// A zero quaternion has no inverse and is returned unchanged.
    pub fn inverse(&self) -> Self {
        let q = NaQuaternion::new(self.w, self.x, self.y, self.z);
        match q.try_inverse() {
            Some(inv) => Self::from(inv).normalized(),
            None => *self,
        }
    }

    /// Unit-length copy; a zero quaternion is returned unchanged
    pub fn normalized(&self) -> Self {
        let norm = self.norm();
        if norm == 0.0 {
            *self
        } else {
            Self::new(self.x / norm, self.y / norm, self.z / norm, self.w / norm)
        }
    }

    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt()
    }
}

impl From<NaQuaternion<f64>> for Quaternion {
    fn from(q: NaQuaternion<f64>) -> Self {
        Self::new(q.i, q.j, q.k, q.w)
    }
}

impl From<UnitQuaternion<f64>> for Quaternion {
    fn from(q: UnitQuaternion<f64>) -> Self {
        q.into_inner().into()
    }
}

/// Position + orientation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector3,
    pub orientation: Quaternion,
}

impl Pose {
    pub const fn new(position: Vector3, orientation: Quaternion) -> Self {
        Self {
            position,
            orientation,
        }
    }
}
