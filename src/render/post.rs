//! Image-space post effects: bloom and the depth-keyed blur.
//!
//! Both passes run after every triangle has been drawn and work directly on
//! the frame's color buffer, reading the depth buffer where needed.

use crate::color::{Rgb, RgbF};

/// Bloom buffer width and height in cells.
pub const BLOOM_SIZE: usize = 32;

/// Fraction of each framebuffer pixel accumulated into its bloom cell.
const BLOOM_GAIN: f32 = 0.001;

/// Reciprocal depth below which (i.e. view depth beyond which) the blur
/// applies. 1/0.037 is roughly 27 units out.
const BLUR_DEPTH_THRESHOLD: f32 = 0.037;

const MAX_CELL: f32 = (BLOOM_SIZE - 1) as f32;

/// Low-resolution accumulation buffer for the bloom pass.
///
/// Cells are floating point: a single framebuffer pixel contributes far
/// less than one 8-bit step, and only the sum over a cell's footprint is
/// visible.
pub struct BloomBuffer {
    cells: Vec<RgbF>,
}

impl Default for BloomBuffer {
    fn default() -> Self {
        Self {
            cells: vec![RgbF::ZERO; BLOOM_SIZE * BLOOM_SIZE],
        }
    }
}

impl BloomBuffer {
    fn clear(&mut self) {
        self.cells.fill(RgbF::ZERO);
    }

    #[inline]
    fn cell(&self, x: usize, y: usize) -> RgbF {
        self.cells[y * BLOOM_SIZE + x]
    }

    /// Bilinear sample at cell coordinates `(x, y)` in `[0, 32)`.
    /// Indices clamp to the buffer edge, no wrapping.
    fn sample_bilinear(&self, x: f32, y: f32) -> Rgb {
        let x = x - 0.5;
        let y = y - 0.5;
        let fx = x - x.floor();
        let fy = y - y.floor();

        let x0 = x.floor().clamp(0.0, MAX_CELL) as usize;
        let x1 = (x.floor() + 1.0).clamp(0.0, MAX_CELL) as usize;
        let y0 = y.floor().clamp(0.0, MAX_CELL) as usize;
        let y1 = (y.floor() + 1.0).clamp(0.0, MAX_CELL) as usize;

        let mut acc = RgbF::ZERO;
        acc.accumulate_f(self.cell(x0, y0), (1.0 - fx) * (1.0 - fy));
        acc.accumulate_f(self.cell(x1, y0), fx * (1.0 - fy));
        acc.accumulate_f(self.cell(x0, y1), (1.0 - fx) * fy);
        acc.accumulate_f(self.cell(x1, y1), fx * fy);
        acc.to_rgb_saturating()
    }
}

/// Bloom: every framebuffer pixel feeds a fraction of its color into a
/// 32x32 accumulator, which is then sampled bilinearly back over the frame
/// and added with per-channel saturation. Bright regions glow, dark ones
/// are unaffected, and nothing can wrap past 255.
pub fn apply_bloom(color: &mut [Rgb], resolution: usize, bloom: &mut BloomBuffer) {
    bloom.clear();

    for y in 0..resolution {
        let cell_row = y * BLOOM_SIZE / resolution * BLOOM_SIZE;
        for x in 0..resolution {
            let cell = cell_row + x * BLOOM_SIZE / resolution;
            bloom.cells[cell].accumulate(color[y * resolution + x], BLOOM_GAIN);
        }
    }

    let to_cell = BLOOM_SIZE as f32 / resolution as f32;
    for y in 0..resolution {
        for x in 0..resolution {
            let glow = bloom.sample_bilinear(x as f32 * to_cell, y as f32 * to_cell);
            let pixel = &mut color[y * resolution + x];
            *pixel = pixel.saturating_add(glow);
        }
    }
}

/// Depth-keyed box blur: pixels past the depth threshold are replaced by a
/// weighted average of their in-bounds neighbors that are also past the
/// threshold, so sharp near geometry never bleeds into the blurred
/// background. Runs in place in scanline order; nearer pixels are
/// untouched.
pub fn apply_depth_blur(color: &mut [Rgb], depth: &[f32], resolution: usize, radius: i32) {
    let r = radius as f32;

    for y in 0..resolution as i32 {
        for x in 0..resolution as i32 {
            if depth[(y * resolution as i32 + x) as usize] >= BLUR_DEPTH_THRESHOLD {
                continue;
            }

            let mut acc = RgbF::ZERO;
            let mut total_weight = 0.0;

            for i in -radius..=radius {
                for j in -radius..=radius {
                    let (yy, xx) = (y + i, x + j);
                    if yy < 0 || yy >= resolution as i32 || xx < 0 || xx >= resolution as i32 {
                        continue;
                    }
                    let idx = (yy * resolution as i32 + xx) as usize;
                    if depth[idx] >= BLUR_DEPTH_THRESHOLD {
                        continue;
                    }

                    // Weight peaks at the center and falls off with the
                    // fractional offset; the center always qualifies, so
                    // the total is never zero.
                    let weight = (r - (i as f32 / r).abs()) * (r - (j as f32 / r).abs());
                    acc.accumulate(color[idx], weight);
                    total_weight += weight;
                }
            }

            color[(y * resolution as i32 + x) as usize] = RgbF {
                r: acc.r / total_weight,
                g: acc.g / total_weight,
                b: acc.b / total_weight,
            }
            .to_rgb_saturating();
        }
    }
}
