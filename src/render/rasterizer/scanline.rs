//! Scanline triangle rasterization.
//!
//! Triangles arrive projected onto the unit square. They are scaled to
//! pixel space, the vertices are sorted by Y, and the triangle is walked in
//! two halves (top vertex to middle, middle to bottom) sharing one scan
//! routine parameterized by its pair of edges. The long edge (top vertex to
//! bottom vertex) keeps its X accumulator across the middle vertex, so the
//! two halves meet exactly.
//!
//! # Perspective correction
//!
//! Per pixel, each vertex offset from the pixel is divided by that vertex's
//! reciprocal depth before computing barycentric weights. The weights then
//! carry the 1/z factor, so a plain weighted sum of any vertex attribute
//! (UV, vertex light, reciprocal depth itself) is perspective correct.
//!
//! # Shading
//!
//! A fixed chain of toggleable effects runs for each covered pixel that
//! passes the depth test: base color (flat white or texture sample),
//! chroma-key abort, vertex-color darkening, per-face darkening, fog, and
//! the wireframe overlay. The wireframe overlay can resurrect a pixel the
//! chroma key aborted; it paints scan edges, so it needs no extra line
//! drawing pass.

use super::RasterTriangle;
use crate::color::Rgb;
use crate::engine::RenderConfig;
use crate::math::Vec2;
use crate::render::framebuffer::FrameBuffer;
use crate::texture::{Texture, TEXTURE_SIZE, TRANSPARENT};

/// Step assigned to a zero-height edge. The matching half has an empty row
/// range and never walks the edge; the sentinel only keeps setup finite.
const DEGENERATE_SLOPE: f32 = 1000.0;

/// View depth beyond which fog starts to darken.
const FOG_START: f32 = 20.0;

const WIREFRAME_COLOR: Rgb = Rgb::new(190, 190, 190);

/// Pixels within this many columns of a scan edge count as wireframe.
const WIREFRAME_EDGE_WIDTH: f32 = 2.0;

/// Rows below the top vertex that count as wireframe.
const WIREFRAME_TOP_WIDTH: f32 = 4.0;

/// A triangle vertex scaled into pixel coordinates.
#[derive(Clone, Copy)]
struct PixelVertex {
    x: f32,
    y: f32,
    /// Reciprocal view depth, unchanged by the pixel scaling.
    inv_z: f32,
    uv: Vec2,
    light: Rgb,
}

/// One triangle edge walked down the scan: the current X intercept and its
/// per-row step (dx/dy in pixel rows).
struct Edge {
    x: f32,
    step: f32,
}

impl Edge {
    fn new(from: &PixelVertex, to: &PixelVertex, rows: i32) -> Self {
        let step = if rows == 0 {
            DEGENERATE_SLOPE
        } else {
            (to.x - from.x) / rows as f32
        };
        Self { x: from.x, step }
    }

    #[inline]
    fn advance_by(&mut self, rows: i32) {
        self.x += self.step * rows as f32;
    }
}

pub struct ScanlineRasterizer;

impl ScanlineRasterizer {
    pub fn new() -> Self {
        Self
    }

    /// Draws one projected triangle into the color and depth buffers.
    pub fn draw_triangle(
        &self,
        triangle: &RasterTriangle,
        buffer: &mut FrameBuffer,
        texture: &Texture,
        config: &RenderConfig,
    ) {
        let scale = buffer.resolution() as f32;
        let mut p = triangle.points.map(|v| PixelVertex {
            x: v.x * scale,
            y: v.y * scale,
            inv_z: v.inv_z,
            uv: v.uv,
            light: v.light,
        });

        // Sort ascending by Y; three compares suffice for three vertices.
        if p[1].y < p[0].y {
            p.swap(0, 1);
        }
        if p[2].y < p[1].y {
            p.swap(1, 2);
        }
        if p[1].y < p[0].y {
            p.swap(0, 1);
        }

        let y_top = p[0].y as i32;
        let y_mid = p[1].y as i32;
        let y_bot = p[2].y as i32;

        let setup = TriangleSetup {
            points: p,
            top_y: p[0].y,
            face_light: triangle.face_light,
            texture,
            config,
        };

        // The long edge spans both halves and keeps its accumulator across
        // the middle vertex; the short edge is replaced there.
        let mut long_edge = Edge::new(&p[0], &p[2], y_bot - y_top);

        let mut short_edge = Edge::new(&p[0], &p[1], y_mid - y_top);
        setup.scan_half(buffer, y_top, y_mid, &mut short_edge, &mut long_edge);

        let mut short_edge = Edge::new(&p[1], &p[2], y_bot - y_mid);
        setup.scan_half(buffer, y_mid, y_bot, &mut short_edge, &mut long_edge);
    }
}

impl Default for ScanlineRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

struct TriangleSetup<'a> {
    points: [PixelVertex; 3],
    /// Pixel-space Y of the topmost vertex, for the wireframe overlay.
    top_y: f32,
    face_light: u8,
    texture: &'a Texture,
    config: &'a RenderConfig,
}

impl TriangleSetup<'_> {
    /// Walks integer rows `[y_from, y_to)` between two edges, clamping to
    /// the screen. Rows skipped above the screen still advance both edge
    /// accumulators so the visible part starts at the right X.
    fn scan_half(
        &self,
        buffer: &mut FrameBuffer,
        y_from: i32,
        y_to: i32,
        a: &mut Edge,
        b: &mut Edge,
    ) {
        let resolution = buffer.resolution() as i32;

        let mut y = y_from;
        if y < 0 {
            let skip = (-y).min(y_to - y_from);
            a.advance_by(skip);
            b.advance_by(skip);
            y += skip;
        }

        while y < y_to && y < resolution {
            // Order per row so the span is always left-to-right.
            let (span_start, span_end) = if a.x <= b.x { (a.x, b.x) } else { (b.x, a.x) };

            let x_from = span_start.ceil().max(0.0) as i32;
            let x_to = span_end.ceil().min(resolution as f32) as i32;
            for x in x_from..x_to {
                self.shade_pixel(buffer, x, y, span_start, span_end);
            }

            a.advance_by(1);
            b.advance_by(1);
            y += 1;
        }
    }

    fn shade_pixel(
        &self,
        buffer: &mut FrameBuffer,
        x: i32,
        y: i32,
        span_start: f32,
        span_end: f32,
    ) {
        let (xf, yf) = (x as f32, y as f32);
        let [p0, p1, p2] = &self.points;

        // Offsets from the pixel, pre-divided by reciprocal depth. Far
        // vertices land closer to the origin and so pull attributes harder,
        // which is exactly the perspective correction.
        let a = self
            .points
            .map(|p| ((p.x - xf) / p.inv_z, (p.y - yf) / p.inv_z));

        let den =
            (a[1].1 - a[2].1) * (a[0].0 - a[2].0) + (a[2].0 - a[1].0) * (a[0].1 - a[2].1);
        // A degenerate triangle collapses the weights onto the last vertex.
        let inv_den = if den != 0.0 { 1.0 / den } else { 0.0 };

        let w0 = ((a[1].1 - a[2].1) * -a[2].0 + (a[2].0 - a[1].0) * -a[2].1) * inv_den;
        let w1 = ((a[2].1 - a[0].1) * -a[2].0 + (a[0].0 - a[2].0) * -a[2].1) * inv_den;
        let w2 = 1.0 - w0 - w1;

        let inv_z = p0.inv_z * w0 + p1.inv_z * w1 + p2.inv_z * w2;

        let (xu, yu) = (x as usize, y as usize);
        if !buffer.depth_passes(xu, yu, inv_z) {
            return;
        }

        let mut color = Rgb::BLACK;
        let mut draw = false;

        if self.config.fill {
            draw = true;

            if self.config.shade_flat {
                color = Rgb::WHITE;
            } else {
                let max_texel = (TEXTURE_SIZE - 1) as f32;
                let u = ((p0.uv.x * w0 + p1.uv.x * w1 + p2.uv.x * w2) * TEXTURE_SIZE as f32)
                    .clamp(0.0, max_texel);
                let v = ((p0.uv.y * w0 + p1.uv.y * w1 + p2.uv.y * w2) * TEXTURE_SIZE as f32)
                    .clamp(0.0, max_texel);

                color = if self.config.texture_filter {
                    self.texture.sample_bilinear(u, v)
                } else {
                    self.texture.sample_nearest(u, v)
                };
                if color == TRANSPARENT {
                    draw = false;
                }
            }

            if self.config.vertex_color {
                color = color.darken_channels(
                    p0.light.r as f32 * w0 + p1.light.r as f32 * w1 + p2.light.r as f32 * w2,
                    p0.light.g as f32 * w0 + p1.light.g as f32 * w1 + p2.light.g as f32 * w2,
                    p0.light.b as f32 * w0 + p1.light.b as f32 * w1 + p2.light.b as f32 * w2,
                );
            }

            if self.config.face_lighting {
                color = color.darken(self.face_light as f32);
            }

            if self.config.fog {
                let z_view = 1.0 / inv_z;
                if z_view > FOG_START {
                    color = color.darken((z_view - FOG_START) * self.config.fog_strength);
                }
            }
        }

        if self.config.wireframe
            && (yf - WIREFRAME_TOP_WIDTH < self.top_y
                || xf - WIREFRAME_EDGE_WIDTH < span_start
                || xf + WIREFRAME_EDGE_WIDTH > span_end)
        {
            color = WIREFRAME_COLOR;
            draw = true;
        }

        if draw {
            buffer.write(xu, yu, inv_z, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipping::ScreenVertex;
    use crate::render::renderer::Renderer;

    fn vertex(x: f32, y: f32, inv_z: f32, u: f32) -> ScreenVertex {
        ScreenVertex {
            x,
            y,
            inv_z,
            uv: Vec2::new(u, 0.0),
            light: Rgb::BLACK,
        }
    }

    fn flat_config() -> RenderConfig {
        RenderConfig {
            shade_flat: true,
            face_lighting: false,
            ..RenderConfig::default()
        }
    }

    fn solid_texture(color: Rgb) -> Texture {
        Texture::from_texels(vec![color; TEXTURE_SIZE * TEXTURE_SIZE])
    }

    /// The projected single-triangle scene: (-1,-1,5), (1,-1,5), (0,1,5)
    /// through fov = 1 lands on these unit-square points.
    fn projected_triangle() -> RasterTriangle {
        RasterTriangle::new(
            [
                vertex(0.3, 0.7, 0.2, 0.0),
                vertex(0.7, 0.7, 0.2, 0.0),
                vertex(0.5, 0.3, 0.2, 0.0),
            ],
            0,
        )
    }

    #[test]
    fn flat_shaded_triangle_is_white_inside_black_outside() {
        let mut renderer = Renderer::new(8);
        let rasterizer = ScanlineRasterizer::new();
        let texture = Texture::default();

        rasterizer.draw_triangle(
            &projected_triangle(),
            &mut renderer.as_framebuffer(),
            &texture,
            &flat_config(),
        );

        let color = renderer.color();
        // Pixel (4, 4) is inside the projection, the corners are not.
        assert_eq!(color[4 * 8 + 4], Rgb::WHITE);
        assert_eq!(color[0], Rgb::BLACK);
        assert_eq!(color[7 * 8 + 7], Rgb::BLACK);

        for (i, &c) in color.iter().enumerate() {
            assert!(
                c == Rgb::WHITE || c == Rgb::BLACK,
                "pixel {} is neither fill nor clear color",
                i
            );
        }
    }

    #[test]
    fn covered_pixels_write_depth() {
        let mut renderer = Renderer::new(8);
        ScanlineRasterizer::new().draw_triangle(
            &projected_triangle(),
            &mut renderer.as_framebuffer(),
            &Texture::default(),
            &flat_config(),
        );

        let depth = renderer.depth();
        assert!((depth[4 * 8 + 4] - 0.2).abs() < 1e-4);
        assert_eq!(depth[0], 0.0);
        assert!(depth.iter().all(|d| d.is_finite() && *d >= 0.0));
    }

    #[test]
    fn nearer_triangle_wins_regardless_of_draw_order() {
        let near = RasterTriangle::new(
            [
                vertex(0.1, 0.9, 0.5, 0.0),
                vertex(0.9, 0.9, 0.5, 0.0),
                vertex(0.5, 0.1, 0.5, 0.0),
            ],
            0,
        );
        let far = RasterTriangle::new(
            [
                vertex(0.1, 0.9, 0.1, 0.0),
                vertex(0.9, 0.9, 0.1, 0.0),
                vertex(0.5, 0.1, 0.1, 0.0),
            ],
            0,
        );

        let config = RenderConfig {
            face_lighting: false,
            texture_filter: false,
            ..RenderConfig::default()
        };
        let red = solid_texture(Rgb::new(255, 0, 0));
        let blue = solid_texture(Rgb::new(0, 0, 255));

        for (first, first_tex, second, second_tex) in
            [(&far, &red, &near, &blue), (&near, &blue, &far, &red)]
        {
            let mut renderer = Renderer::new(16);
            let rasterizer = ScanlineRasterizer::new();
            let mut fb = renderer.as_framebuffer();
            rasterizer.draw_triangle(first, &mut fb, first_tex, &config);
            rasterizer.draw_triangle(second, &mut fb, second_tex, &config);

            assert_eq!(renderer.color()[8 * 16 + 8], Rgb::new(0, 0, 255));
        }
    }

    #[test]
    fn transparent_texel_leaves_pixel_and_depth_untouched() {
        let mut renderer = Renderer::new(8);
        let config = RenderConfig {
            face_lighting: false,
            ..RenderConfig::default()
        };

        ScanlineRasterizer::new().draw_triangle(
            &projected_triangle(),
            &mut renderer.as_framebuffer(),
            &solid_texture(TRANSPARENT),
            &config,
        );

        assert!(renderer.color().iter().all(|&c| c == Rgb::BLACK));
        assert!(renderer.depth().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn wireframe_draws_edges_without_fill() {
        let mut renderer = Renderer::new(64);
        let config = RenderConfig {
            fill: false,
            wireframe: true,
            ..RenderConfig::default()
        };

        let tri = RasterTriangle::new(
            [
                vertex(0.1, 0.9, 0.2, 0.0),
                vertex(0.9, 0.9, 0.2, 0.0),
                vertex(0.5, 0.1, 0.2, 0.0),
            ],
            0,
        );
        ScanlineRasterizer::new().draw_triangle(
            &tri,
            &mut renderer.as_framebuffer(),
            &Texture::default(),
            &config,
        );

        let color = renderer.color();
        // Row 40 spans roughly columns 15..50: edges gray, interior empty.
        assert_eq!(color[40 * 64 + 15], WIREFRAME_COLOR);
        assert_eq!(color[40 * 64 + 49], WIREFRAME_COLOR);
        assert_eq!(color[40 * 64 + 32], Rgb::BLACK);
    }

    #[test]
    fn u_interpolates_along_reciprocal_depth() {
        // A full-screen quad, near on the left (z = 2), far on the right
        // (z = 20), with a stripe texture. Perspective-correct sampling
        // packs more stripes into the far half of the scanline.
        let mut texels = vec![Rgb::BLACK; TEXTURE_SIZE * TEXTURE_SIZE];
        for y in 0..TEXTURE_SIZE {
            for x in 0..TEXTURE_SIZE {
                if (x / 8) % 2 == 0 {
                    texels[y * TEXTURE_SIZE + x] = Rgb::WHITE;
                }
            }
        }
        let stripes = Texture::from_texels(texels);

        let config = RenderConfig {
            texture_filter: false,
            face_lighting: false,
            ..RenderConfig::default()
        };

        let tl = vertex(0.0, 0.0, 0.5, 0.0);
        let tr = vertex(1.0, 0.0, 0.05, 1.0);
        let bl = vertex(0.0, 1.0, 0.5, 0.0);
        let br = vertex(1.0, 1.0, 0.05, 1.0);

        let mut renderer = Renderer::new(64);
        let rasterizer = ScanlineRasterizer::new();
        let mut fb = renderer.as_framebuffer();
        rasterizer.draw_triangle(&RasterTriangle::new([tl, tr, bl], 0), &mut fb, &stripes, &config);
        rasterizer.draw_triangle(&RasterTriangle::new([bl, tr, br], 0), &mut fb, &stripes, &config);

        let row = &renderer.color()[32 * 64..33 * 64];
        let transitions = |pixels: &[Rgb]| {
            pixels
                .windows(2)
                .filter(|pair| pair[0] != pair[1])
                .count()
        };

        let near_half = transitions(&row[..32]);
        let far_half = transitions(&row[32..]);
        assert!(
            far_half > near_half,
            "expected denser stripes far: near {} far {}",
            near_half,
            far_half
        );
    }
}
