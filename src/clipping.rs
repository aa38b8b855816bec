//! Near-plane clipping and unit-square projection.
//!
//! Triangles are clipped in view space against the single plane
//! `z = near` with a Sutherland-Hodgman edge walk, projected onto the unit
//! square, then fanned back into triangles. Side planes are never clipped;
//! the rasterizer bounds each scanline in screen space instead.
//!
//! All clipping scratch lives on the stack: one plane can add at most one
//! vertex, so the output polygon holds at most four.

use crate::color::Rgb;
use crate::math::{Vec2, Vec3};

/// A view-space vertex carrying every attribute that must survive clipping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipVertex {
    /// View-space position; `z` is the view depth.
    pub position: Vec3,
    pub uv: Vec2,
    pub light: Rgb,
}

impl ClipVertex {
    pub fn new(position: Vec3, uv: Vec2, light: Rgb) -> Self {
        Self {
            position,
            uv,
            light,
        }
    }

    /// Linear view-space interpolation of position and attributes.
    /// Used where a triangle edge crosses the near plane.
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position + (other.position - self.position) * t,
            uv: self.uv.lerp(other.uv, t),
            light: self.light.lerp(other.light, t),
        }
    }
}

/// A vertex projected onto the unit square, ready for rasterization.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenVertex {
    /// Horizontal position in `[0, 1]`.
    pub x: f32,
    /// Vertical position in `[0, 1]`, increasing downward.
    pub y: f32,
    /// Reciprocal view depth. Larger means nearer.
    pub inv_z: f32,
    pub uv: Vec2,
    pub light: Rgb,
}

/// Projects a clipped view-space vertex onto the unit square.
///
/// The near-plane clip guarantees `position.z >= near > 0`, so the divides
/// are safe.
#[inline]
pub fn project(v: &ClipVertex, fov: f32) -> ScreenVertex {
    let scale = v.position.z * fov;
    ScreenVertex {
        x: v.position.x / scale + 0.5,
        y: -v.position.y / scale + 0.5,
        inv_z: 1.0 / v.position.z,
        uv: v.uv,
        light: v.light,
    }
}

/// Clip output polygon: 0, 3, or 4 vertices on the stack.
#[derive(Debug)]
pub struct ClipPolygon {
    vertices: [ClipVertex; 4],
    len: usize,
}

impl ClipPolygon {
    fn push(&mut self, v: ClipVertex) {
        self.vertices[self.len] = v;
        self.len += 1;
    }

    pub fn vertices(&self) -> &[ClipVertex] {
        &self.vertices[..self.len]
    }

    /// True when the polygon cannot form a triangle.
    pub fn is_empty(&self) -> bool {
        self.len < 3
    }
}

/// Clips a view-space triangle against the plane `z = near`.
///
/// Vertices with `z >= near` are kept; each edge strictly straddling the
/// plane contributes one interpolated vertex sitting exactly on it. An edge
/// touching the plane at an endpoint adds nothing extra, so no division by
/// zero can occur. A fully-behind triangle yields an empty polygon.
pub fn clip_near(tri: &[ClipVertex; 3], near: f32) -> ClipPolygon {
    let mut out = ClipPolygon {
        vertices: [tri[0]; 4],
        len: 0,
    };

    for i in 0..3 {
        let current = &tri[i];
        let next = &tri[(i + 1) % 3];

        let d1 = current.position.z - near;
        let d2 = next.position.z - near;

        if d1 >= 0.0 {
            out.push(*current);
        }

        // Strictly opposite sides: emit the crossing point, pinned to the
        // plane so the projection never sees z < near.
        if (d1 < 0.0 && d2 > 0.0) || (d1 > 0.0 && d2 < 0.0) {
            let t = d1 / (d1 - d2);
            let mut crossing = current.lerp(next, t);
            crossing.position.z = near;
            out.push(crossing);
        }
    }

    out
}

/// Projected triangles fanned out of one clipped polygon: at most two.
#[derive(Debug, Default)]
pub struct ClippedTriangles {
    triangles: [[ScreenVertex; 3]; 2],
    len: usize,
}

impl ClippedTriangles {
    pub fn as_slice(&self) -> &[[ScreenVertex; 3]] {
        &self.triangles[..self.len]
    }
}

/// Clips a view-space triangle against the near plane, projects the
/// surviving polygon, and fans it from vertex 0 into at most two triangles.
///
/// Fan triangles whose three projected vertices all lie beyond one edge of
/// the unit square are dropped; partial overlaps are left for the
/// rasterizer's scanline bounds.
pub fn clip_and_project(tri: &[ClipVertex; 3], near: f32, fov: f32) -> ClippedTriangles {
    let polygon = clip_near(tri, near);

    let mut out = ClippedTriangles::default();
    if polygon.is_empty() {
        return out;
    }

    let mut projected = [ScreenVertex::default(); 4];
    for (slot, v) in projected.iter_mut().zip(polygon.vertices()) {
        *slot = project(v, fov);
    }

    for i in 1..polygon.vertices().len() - 1 {
        let fan = [projected[0], projected[i], projected[i + 1]];
        if !outside_unit_square(&fan) {
            out.triangles[out.len] = fan;
            out.len += 1;
        }
    }
    out
}

/// True when all three vertices are beyond a single unit-square edge.
fn outside_unit_square(tri: &[ScreenVertex; 3]) -> bool {
    tri.iter().all(|v| v.x < 0.0)
        || tri.iter().all(|v| v.x > 1.0)
        || tri.iter().all(|v| v.y < 0.0)
        || tri.iter().all(|v| v.y > 1.0)
}
