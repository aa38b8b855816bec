//! Owned frame storage.
//!
//! The [`Renderer`] allocates the square color and depth buffers once at
//! startup and hands out [`FrameBuffer`] views per frame. Both buffers are
//! indexed `y * resolution + x`.

use super::framebuffer::FrameBuffer;
use crate::color::Rgb;

pub struct Renderer {
    color: Vec<Rgb>,
    depth: Vec<f32>,
    resolution: usize,
}

impl Renderer {
    pub fn new(resolution: usize) -> Self {
        let size = resolution * resolution;
        Self {
            color: vec![Rgb::BLACK; size],
            depth: vec![0.0; size],
            resolution,
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Clears color to black and depth to 0 (infinitely far).
    pub fn clear(&mut self) {
        self.color.fill(Rgb::BLACK);
        self.depth.fill(0.0);
    }

    pub fn as_framebuffer(&mut self) -> FrameBuffer<'_> {
        FrameBuffer::new(&mut self.color, &mut self.depth, self.resolution)
    }

    pub fn color(&self) -> &[Rgb] {
        &self.color
    }

    pub fn color_mut(&mut self) -> &mut [Rgb] {
        &mut self.color
    }

    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    /// Split borrow for the depth-keyed blur, which rewrites color while
    /// reading depth.
    pub fn color_and_depth_mut(&mut self) -> (&mut [Rgb], &[f32]) {
        (&mut self.color, &self.depth)
    }

    /// The color buffer as contiguous RGB bytes, 3 per pixel, for the
    /// display upload.
    pub fn as_bytes(&self) -> &[u8] {
        // Rgb is #[repr(C)] with three u8 fields, so the buffer is already
        // a packed byte array.
        unsafe {
            std::slice::from_raw_parts(self.color.as_ptr() as *const u8, self.color.len() * 3)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_is_idempotent() {
        let mut renderer = Renderer::new(4);
        renderer
            .as_framebuffer()
            .write(2, 3, 0.25, Rgb::new(9, 9, 9));

        renderer.clear();
        let (color_once, depth_once) = (renderer.color().to_vec(), renderer.depth().to_vec());
        renderer.clear();

        assert_eq!(renderer.color(), &color_once[..]);
        assert_eq!(renderer.depth(), &depth_once[..]);
        assert!(renderer.color().iter().all(|&c| c == Rgb::BLACK));
        assert!(renderer.depth().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn byte_export_is_three_bytes_per_pixel() {
        let mut renderer = Renderer::new(2);
        renderer
            .as_framebuffer()
            .write(1, 0, 0.5, Rgb::new(1, 2, 3));

        let bytes = renderer.as_bytes();
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[3..6], &[1, 2, 3]);
    }
}
