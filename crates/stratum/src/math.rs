//! Math types and glam re-exports.
//!
//! [glam](https://docs.rs/glam) types are re-exported so hosts don't need
//! their own dependency on it. [`Transform`] is the local position, rotation
//! and scale of an entity; the hierarchy system turns it into a world matrix.

use serde::{Deserialize, Serialize};

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

/// Local position, rotation and scale.
///
/// 2D content uses the XY plane and rotates around Z.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            translation: Vec3::new(x, y, z),
            ..Self::IDENTITY
        }
    }

    pub fn from_xy(x: f32, y: f32) -> Self {
        Self::from_xyz(x, y, 0.0)
    }

    /// Copy with a uniform scale.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Copy rotated `radians` around Z (the 2D rotation).
    pub fn with_rotation_z(mut self, radians: f32) -> Self {
        self.rotation = Quat::from_rotation_z(radians);
        self
    }

    /// Move by `delta` in local-parent space.
    pub fn translate(&mut self, delta: Vec3) {
        self.translation += delta;
    }

    /// The 4x4 model matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_matrix() {
        assert_eq!(Transform::default().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn matrix_applies_scale_then_translation() {
        let t = Transform::from_xy(10.0, 5.0).with_scale(2.0);
        let p = t.matrix().transform_point3(Vec3::new(1.0, 1.0, 0.0));
        assert!((p - Vec3::new(12.0, 7.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn rotation_z_quarter_turn() {
        let t = Transform::default().with_rotation_z(std::f32::consts::FRAC_PI_2);
        let p = t.matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn serde_roundtrip_keeps_fields() {
        let t = Transform::from_xyz(1.0, 2.0, 3.0).with_scale(0.5);
        let json = serde_json::to_string(&t).unwrap();
        let back: Transform = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
