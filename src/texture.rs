//! Fixed-size 2D texture with chroma-key transparency.
//!
//! Textures are 128x128 RGB, stored bottom row first to match the
//! bottom-left UV origin. The exact color (255, 0, 255) is reserved as the
//! transparent sentinel: the rasterizer drops any pixel whose final sample
//! is that color.

use std::path::Path;

use crate::color::{Rgb, RgbF};

/// Texture width and height in texels.
pub const TEXTURE_SIZE: usize = 128;

/// The chroma-key sentinel. Texels of this exact color are never drawn.
pub const TRANSPARENT: Rgb = Rgb::new(255, 0, 255);

const MAX_TEXEL: f32 = (TEXTURE_SIZE - 1) as f32;

/// A 128x128 RGB texture sampled in texel space.
///
/// Sampling coordinates are in `[0, 128)` texel units; callers clamp to
/// `[0, 127]` before sampling. Both filters honor the transparent sentinel.
pub struct Texture {
    texels: Vec<Rgb>,
}

impl Default for Texture {
    /// An all-black texture, used when no image asset is available.
    fn default() -> Self {
        Self {
            texels: vec![Rgb::BLACK; TEXTURE_SIZE * TEXTURE_SIZE],
        }
    }
}

impl Texture {
    /// Loads a texture from an image file, resampling to 128x128 if needed.
    ///
    /// The image's bottom row becomes row 0 so that v = 0 is the bottom-left
    /// of the source image.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, image::ImageError> {
        let img = image::open(path)?.to_rgb8();
        let img = if img.dimensions() == (TEXTURE_SIZE as u32, TEXTURE_SIZE as u32) {
            img
        } else {
            image::imageops::resize(
                &img,
                TEXTURE_SIZE as u32,
                TEXTURE_SIZE as u32,
                image::imageops::FilterType::Nearest,
            )
        };

        let mut texels = vec![Rgb::BLACK; TEXTURE_SIZE * TEXTURE_SIZE];
        for (x, y, pixel) in img.enumerate_pixels() {
            let [r, g, b] = pixel.0;
            let flipped_y = TEXTURE_SIZE - 1 - y as usize;
            texels[flipped_y * TEXTURE_SIZE + x as usize] = Rgb::new(r, g, b);
        }

        Ok(Self { texels })
    }

    /// Builds a texture from raw texels, row 0 at the bottom.
    ///
    /// # Panics
    /// Panics if `texels` is not exactly 128x128 entries.
    pub fn from_texels(texels: Vec<Rgb>) -> Self {
        assert_eq!(
            texels.len(),
            TEXTURE_SIZE * TEXTURE_SIZE,
            "texture must be 128x128"
        );
        Self { texels }
    }

    #[inline]
    fn texel(&self, x: usize, y: usize) -> Rgb {
        self.texels[y * TEXTURE_SIZE + x]
    }

    /// Nearest-neighbor sample at texel coordinates `(u, v)` in `[0, 128)`.
    #[inline]
    pub fn sample_nearest(&self, u: f32, v: f32) -> Rgb {
        self.texel(u as usize, v as usize)
    }

    /// Bilinear sample at texel coordinates `(u, v)` in `[0, 128)`.
    ///
    /// The four taps sit at half-texel offsets around `(u, v)`. Taps equal
    /// to the transparent sentinel are replaced by the center texel so
    /// transparency does not bleed color into opaque neighbors; if the
    /// center texel is itself the sentinel, the sentinel is returned and the
    /// caller drops the pixel. Weighted contributions accumulate in floats
    /// and collapse with one saturating cast.
    pub fn sample_bilinear(&self, u: f32, v: f32) -> Rgb {
        let center = self.sample_nearest(u, v);
        if center == TRANSPARENT {
            return TRANSPARENT;
        }

        let x = u - 0.5;
        let y = v - 0.5;
        let fx = x - x.floor();
        let fy = y - y.floor();

        let x0 = x.floor().clamp(0.0, MAX_TEXEL) as usize;
        let x1 = (x.floor() + 1.0).clamp(0.0, MAX_TEXEL) as usize;
        let y0 = y.floor().clamp(0.0, MAX_TEXEL) as usize;
        let y1 = (y.floor() + 1.0).clamp(0.0, MAX_TEXEL) as usize;

        let taps = [
            (self.texel(x0, y0), (1.0 - fx) * (1.0 - fy)),
            (self.texel(x1, y0), fx * (1.0 - fy)),
            (self.texel(x0, y1), (1.0 - fx) * fy),
            (self.texel(x1, y1), fx * fy),
        ];

        let mut acc = RgbF::ZERO;
        for (tap, weight) in taps {
            let tap = if tap == TRANSPARENT { center } else { tap };
            acc.accumulate(tap, weight);
        }
        acc.to_rgb_saturating()
    }
}
