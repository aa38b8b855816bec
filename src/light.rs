//! Directional face lighting.
//!
//! One fixed light. Each triangle gets a scalar darkening amount from its
//! face normal: faces turned away from the light darken, faces turned
//! toward it stay bright. The same facing term doubles as the back-face
//! test when computed against the camera instead of the light.

use crate::math::Vec3;

/// Default light origin, far above and beside the scene.
pub const LIGHT_ORIGIN: Vec3 = Vec3::new(4000.0, -1000.0, 1000.0);

/// The single directional light.
#[derive(Debug, Clone, Copy)]
pub struct LightRig {
    pub origin: Vec3,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            origin: LIGHT_ORIGIN,
        }
    }
}

impl LightRig {
    /// Darkening amount for a world-space triangle.
    ///
    /// The facing term is probed on copies of the corners translated by the
    /// light origin, so the light acts as a far-away directional source.
    /// Returns a value in `[0, 200]`; see [`darkening`].
    pub fn face_darkening(&self, corners: &[Vec3; 3]) -> u8 {
        let probe = [
            corners[0] + self.origin,
            corners[1] + self.origin,
            corners[2] + self.origin,
        ];
        darkening(facing_dot(&probe))
    }
}

/// Signed facing term for a triangle: its unit face normal dotted with the
/// unit direction from the coordinate origin to the first corner.
///
/// Negative means the face points toward the origin. A degenerate triangle
/// yields NaN, which fails every ordering test and therefore culls.
#[inline]
pub fn facing_dot(corners: &[Vec3; 3]) -> f32 {
    // Counter-clockwise corners (y up) produce a normal toward the viewer.
    let normal = (corners[2] - corners[0])
        .cross(corners[1] - corners[0])
        .normalize();
    normal.dot(corners[0].normalize())
}

/// Remaps a facing term from `[-1, 1]` onto the `[0, 200]` darkening scale.
///
/// The upper bound of 200 (not 255) is deliberate: a fully averted face
/// keeps a little residual brightness, matching the renderer's look.
#[inline]
pub fn darkening(dot: f32) -> u8 {
    ((dot + 1.0) * 100.0) as u8
}
