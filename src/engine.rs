//! Core rendering engine.
//!
//! The [`Engine`] owns the scene (meshes, instances, camera, texture, the
//! light) and drives the per-frame pipeline: clear, transform + cull +
//! light each triangle, clip against the near plane, rasterize, then the
//! optional image-space post passes.

use crate::camera::Camera;
use crate::clipping::{self, ClipVertex};
use crate::color::Rgb;
use crate::light::{darkening, facing_dot, LightRig};
use crate::math::Vec3;
use crate::mesh::{LoadError, Mesh, MeshInstance};
use crate::render::post::{apply_bloom, apply_depth_blur, BloomBuffer};
use crate::render::{RasterTriangle, Renderer, ScanlineRasterizer};
use crate::texture::Texture;

/// Default square framebuffer resolution.
pub const DEFAULT_RESOLUTION: usize = 512;

/// Camera translation at startup, placing the scene in front of the view.
const CAMERA_START: Vec3 = Vec3::new(0.0, -2.0, 30.0);

/// Movement integration factor per millisecond of frame time.
const MOVE_SPEED: f32 = 0.03;

/// Turn integration factor per millisecond of frame time.
const TURN_SPEED: f32 = 0.08;

/// Model spin per millisecond while the spin toggle is on.
const SPIN_SPEED: f32 = 0.0005;

/// Feature toggles and tunables, threaded by reference through the
/// pipeline. One instance per engine; no global state.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Fill triangle interiors. Off leaves only the wireframe overlay.
    pub fill: bool,
    /// Paint scan edges light gray on top of (or instead of) the fill.
    pub wireframe: bool,
    /// Darken pixels past the fog start distance.
    pub fog: bool,
    /// Subtract the per-face darkening derived from the face normal.
    /// The darkening scale runs 0 to 200, not 255.
    pub face_lighting: bool,
    /// Derive face darkening from the camera direction instead of the light.
    pub light_tracks_camera: bool,
    /// Subtract interpolated vertex colors from the base color.
    pub vertex_color: bool,
    /// Flat white base color instead of the texture.
    pub shade_flat: bool,
    /// Bilinear texture filtering; nearest-neighbor when off.
    pub texture_filter: bool,
    pub bloom: bool,
    pub dof_blur: bool,
    /// Spin the first mesh instance around Y.
    pub spin: bool,
    /// Projection scale; larger narrows the view. Must stay positive.
    pub fov: f32,
    /// Near clip plane distance. Must stay positive.
    pub camera_near: f32,
    /// Fog darkening per unit of view depth past the fog start.
    pub fog_strength: f32,
    /// Depth-of-field blur box radius in pixels.
    pub blur_radius: i32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fill: true,
            wireframe: false,
            fog: false,
            face_lighting: true,
            light_tracks_camera: false,
            vertex_color: false,
            shade_flat: false,
            texture_filter: true,
            bloom: false,
            dof_blur: false,
            spin: true,
            fov: 1.0,
            camera_near: 1.0,
            fog_strength: 20.0,
            blur_radius: 3,
        }
    }
}

/// Per-frame control input: held-key axes and velocities.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    /// Movement axes relative to the camera yaw: x strafe, y vertical,
    /// z forward.
    pub movement: Vec3,
    /// Yaw velocity.
    pub yaw: f32,
    /// Pitch velocity.
    pub pitch: f32,
    /// Direct field-of-view nudge, applied once per frame.
    pub fov_delta: f32,
}

pub struct Engine {
    renderer: Renderer,
    rasterizer: ScanlineRasterizer,
    bloom: BloomBuffer,
    meshes: Vec<Mesh>,
    instances: Vec<MeshInstance>,
    camera: Camera,
    light: LightRig,
    texture: Texture,
    pub config: RenderConfig,
}

impl Engine {
    pub fn new(resolution: usize) -> Self {
        Self {
            renderer: Renderer::new(resolution),
            rasterizer: ScanlineRasterizer::new(),
            bloom: BloomBuffer::default(),
            meshes: Vec::new(),
            instances: Vec::new(),
            camera: Camera::new(CAMERA_START),
            light: LightRig::default(),
            texture: Texture::default(),
            config: RenderConfig::default(),
        }
    }

    /// Loads every mesh from an OBJ file and places one instance of the
    /// first. On error the scene is left unchanged.
    pub fn load_mesh(&mut self, path: &str) -> Result<(), LoadError> {
        let meshes = Mesh::load_all(path)?;
        self.meshes = meshes;
        self.instances = vec![MeshInstance::new(0)];
        Ok(())
    }

    /// Adds a mesh without instancing it; returns its index.
    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    pub fn add_instance(&mut self, instance: MeshInstance) {
        self.instances.push(instance);
    }

    pub fn set_texture(&mut self, texture: Texture) {
        self.texture = texture;
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn resolution(&self) -> usize {
        self.renderer.resolution()
    }

    /// The rendered frame as contiguous RGB bytes, 3 per pixel.
    pub fn frame_buffer(&self) -> &[u8] {
        self.renderer.as_bytes()
    }

    pub fn color_buffer(&self) -> &[Rgb] {
        self.renderer.color()
    }

    pub fn depth_buffer(&self) -> &[f32] {
        self.renderer.depth()
    }

    /// Advances the simulation by one frame: camera motion, turning, the
    /// field-of-view nudge, and the model spin.
    pub fn update(&mut self, input: &FrameInput, dt_ms: f32) {
        self.config.fov += input.fov_delta;

        self.camera
            .translate_relative(input.movement * (MOVE_SPEED * dt_ms));
        self.camera.rotate_yaw(input.yaw * TURN_SPEED * dt_ms);
        self.camera.rotate_pitch(input.pitch * TURN_SPEED * dt_ms);

        if self.config.spin {
            if let Some(instance) = self.instances.first_mut() {
                instance.rotation.y =
                    (instance.rotation.y + SPIN_SPEED * dt_ms).rem_euclid(std::f32::consts::TAU);
            }
        }
    }

    /// Renders one frame into the color and depth buffers.
    pub fn render(&mut self) {
        self.renderer.clear();
        let resolution = self.renderer.resolution();

        let Self {
            renderer,
            rasterizer,
            bloom,
            meshes,
            instances,
            camera,
            light,
            texture,
            config,
        } = self;

        let mut fb = renderer.as_framebuffer();

        for instance in instances.iter() {
            let Some(mesh) = meshes.get(instance.mesh) else {
                continue;
            };

            for triangle in mesh.triangles() {
                // Model space -> world space.
                let world = [
                    triangle.vertices[0]
                        .position
                        .rotate_euler(instance.rotation)
                        + instance.position,
                    triangle.vertices[1]
                        .position
                        .rotate_euler(instance.rotation)
                        + instance.position,
                    triangle.vertices[2]
                        .position
                        .rotate_euler(instance.rotation)
                        + instance.position,
                ];

                // World space -> camera-relative; cull before rotating,
                // the facing term is rotation-invariant.
                let relative = [
                    world[0] + camera.position(),
                    world[1] + camera.position(),
                    world[2] + camera.position(),
                ];
                let view_dot = facing_dot(&relative);
                if !(view_dot < 0.0) {
                    continue;
                }

                let face_light = if config.light_tracks_camera {
                    darkening(view_dot)
                } else {
                    light.face_darkening(&world)
                };

                let view = [
                    camera.rotate_view(relative[0]),
                    camera.rotate_view(relative[1]),
                    camera.rotate_view(relative[2]),
                ];

                let clip_tri = [
                    ClipVertex::new(view[0], triangle.vertices[0].uv, triangle.vertices[0].light),
                    ClipVertex::new(view[1], triangle.vertices[1].uv, triangle.vertices[1].light),
                    ClipVertex::new(view[2], triangle.vertices[2].uv, triangle.vertices[2].light),
                ];

                let clipped =
                    clipping::clip_and_project(&clip_tri, config.camera_near, config.fov);
                for points in clipped.as_slice() {
                    rasterizer.draw_triangle(
                        &RasterTriangle::new(*points, face_light),
                        &mut fb,
                        texture,
                        config,
                    );
                }
            }
        }

        drop(fb);

        if config.bloom {
            apply_bloom(renderer.color_mut(), resolution, bloom);
        }
        if config.dof_blur {
            let (color, depth) = renderer.color_and_depth_mut();
            apply_depth_blur(color, depth, resolution, config.blur_radius);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::mesh::{Triangle, Vertex};
    use crate::texture::{TEXTURE_SIZE, TRANSPARENT};

    fn vertex(x: f32, y: f32, z: f32) -> Vertex {
        Vertex {
            position: Vec3::new(x, y, z),
            uv: Vec2::new(0.5, 0.5),
            light: Rgb::BLACK,
        }
    }

    fn single_triangle_engine(vertices: [Vertex; 3]) -> Engine {
        let mut engine = Engine::new(8);
        engine.camera_mut().set_position(Vec3::ZERO);
        engine.config = RenderConfig {
            shade_flat: true,
            face_lighting: false,
            spin: false,
            ..RenderConfig::default()
        };

        let mesh = engine.add_mesh(Mesh::new(vec![Triangle { vertices }]));
        engine.add_instance(MeshInstance::new(mesh));
        engine
    }

    fn front_facing() -> [Vertex; 3] {
        [
            vertex(-1.0, -1.0, 5.0),
            vertex(1.0, -1.0, 5.0),
            vertex(0.0, 1.0, 5.0),
        ]
    }

    #[test]
    fn front_facing_triangle_fills_white() {
        let mut engine = single_triangle_engine(front_facing());
        engine.render();

        let color = engine.color_buffer();
        assert_eq!(color[4 * 8 + 4], Rgb::WHITE);
        assert_eq!(color[0], Rgb::BLACK);
        assert!(color.iter().all(|&c| c == Rgb::WHITE || c == Rgb::BLACK));
    }

    #[test]
    fn reversed_winding_is_culled() {
        let [a, b, c] = front_facing();
        let mut engine = single_triangle_engine([a, c, b]);
        engine.render();

        assert!(engine.color_buffer().iter().all(|&c| c == Rgb::BLACK));
        assert!(engine.depth_buffer().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn transparent_texel_never_reaches_the_frame() {
        let mut engine = single_triangle_engine(front_facing());
        engine.config.shade_flat = false;

        // Every vertex samples the texture center, which is the sentinel.
        // A small block keeps the test robust to interpolation rounding.
        let mut texels = vec![Rgb::WHITE; TEXTURE_SIZE * TEXTURE_SIZE];
        for y in 62..=66 {
            for x in 62..=66 {
                texels[y * TEXTURE_SIZE + x] = TRANSPARENT;
            }
        }
        engine.set_texture(Texture::from_texels(texels));

        engine.render();

        assert!(engine.color_buffer().iter().all(|&c| c == Rgb::BLACK));
        assert!(engine.depth_buffer().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn depth_buffer_stays_finite_and_nonnegative() {
        let mut engine = single_triangle_engine(front_facing());
        engine.config.fog = true;
        engine.config.face_lighting = true;
        engine.config.vertex_color = true;
        engine.config.bloom = true;
        engine.config.dof_blur = true;
        engine.render();

        assert!(engine
            .depth_buffer()
            .iter()
            .all(|d| d.is_finite() && *d >= 0.0));
    }

    #[test]
    fn update_integrates_motion_and_spin() {
        let mut engine = single_triangle_engine(front_facing());
        engine.config.spin = true;

        let input = FrameInput {
            movement: Vec3::new(0.0, 0.0, 1.0),
            yaw: 0.01,
            ..FrameInput::default()
        };
        engine.update(&input, 10.0);

        assert!((engine.camera().position().z - 0.3).abs() < 1e-5);
        assert!(engine.camera().yaw() > 0.0);

        engine.update(&FrameInput::default(), 10.0);
        let spun = engine.instances[0].rotation.y;
        assert!((spun - 0.01).abs() < 1e-5);
    }

    #[test]
    fn fov_nudge_applies_once_per_frame() {
        let mut engine = single_triangle_engine(front_facing());
        let input = FrameInput {
            fov_delta: 0.01,
            ..FrameInput::default()
        };
        engine.update(&input, 16.0);
        assert!((engine.config.fov - 1.01).abs() < 1e-6);
    }
}
