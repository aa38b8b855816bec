//! Free-flying camera.
//!
//! # Coordinate System
//!
//! - X: positive right
//! - Y: positive down in screen terms (projection flips it)
//! - Z: positive forward (into screen)
//!
//! Orientation is yaw (around Y) plus pitch (around X). The view rotation
//! is applied in two stages, yaw first, so pitch always tilts around the
//! screen-horizontal axis.

use crate::math::Vec3;

#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

impl Camera {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Rotates a camera-relative point into view space: yaw around Y, then
    /// pitch around X.
    #[inline]
    pub fn rotate_view(&self, point: Vec3) -> Vec3 {
        point.rotate_y(self.yaw).rotate_x(self.pitch)
    }

    /// Moves the camera by a displacement given in yaw-relative axes
    /// (x strafe, y vertical, z forward). Pitch does not affect movement.
    pub fn translate_relative(&mut self, displacement: Vec3) {
        self.position = self.position + displacement.rotate_y(-self.yaw);
    }

    /// Turns the camera around the Y axis, wrapping into `[0, 2pi)`.
    pub fn rotate_yaw(&mut self, delta: f32) {
        self.yaw = (self.yaw + delta).rem_euclid(std::f32::consts::TAU);
    }

    /// Tilts the camera around the X axis.
    pub fn rotate_pitch(&mut self, delta: f32) {
        self.pitch += delta;
    }
}
