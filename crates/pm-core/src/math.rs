//! Rigid transforms.

use std::ops::Mul;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Rigid transform: rotation followed by translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Translation.
    pub position: Vec3,
    /// Rotation.
    pub orientation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    /// The identity pose.
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        orientation: Quat::IDENTITY,
    };

    /// Create a pose from rotation and translation.
    pub fn new(orientation: Quat, position: Vec3) -> Self {
        Self { position, orientation }
    }

    /// Pure translation.
    pub fn from_translation(position: Vec3) -> Self {
        Self { position, orientation: Quat::IDENTITY }
    }

    /// Pure rotation.
    pub fn from_rotation(orientation: Quat) -> Self {
        Self { position: Vec3::ZERO, orientation }
    }

    /// Homogeneous matrix of this pose.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }

    /// View matrix of a camera placed at this pose.
    pub fn view_matrix(&self) -> Mat4 {
        self.inverse().matrix()
    }

    /// Inverse transform.
    pub fn inverse(&self) -> Pose {
        let orientation = self.orientation.inverse();
        Pose {
            position: orientation * -self.position,
            orientation,
        }
    }

    /// Apply the pose to a point.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.orientation * point + self.position
    }

    /// Rotate a direction vector.
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.orientation * vector
    }

    /// Approximate equality.
    pub fn abs_diff_eq(&self, other: &Pose, max_abs_diff: f32) -> bool {
        self.position.abs_diff_eq(other.position, max_abs_diff)
            && (self.orientation.abs_diff_eq(other.orientation, max_abs_diff)
                || self.orientation.abs_diff_eq(-other.orientation, max_abs_diff))
    }
}

/// `parent * child` applies `child` first, then `parent`.
impl Mul for Pose {
    type Output = Pose;

    fn mul(self, child: Pose) -> Pose {
        Pose {
            position: self.transform_point(child.position),
            orientation: (self.orientation * child.orientation).normalize(),
        }
    }
}
