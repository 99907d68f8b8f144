//! RGBA framebuffer
//!
//! Fixed 128x64, origin top-left, row-major, four 8-bit channels per pixel.
//! The render stage owns it; the transform, codec and driver only borrow it
//! for the duration of one frame.

use core::convert::Infallible;
use core::fmt;

use embedded_graphics::pixelcolor::{Rgb888, RgbColor};
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, Size};

use crate::dither::{self, ImageError};
use crate::gddram::PackedFrame;

/// Panel width in pixels
pub const WIDTH: usize = 128;

/// Panel height in pixels
pub const HEIGHT: usize = 64;

/// Bytes per RGBA pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// Size of the pixel storage in bytes
pub const BUFFER_LEN: usize = WIDTH * HEIGHT * BYTES_PER_PIXEL;

/// One RGBA pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::opaque(0, 0, 0);
    pub const WHITE: Self = Self::opaque(255, 255, 255);

    /// Fully opaque color
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Opaque gray level
    pub const fn gray(level: u8) -> Self {
        Self::opaque(level, level, level)
    }
}

impl From<Rgb888> for Rgba {
    fn from(color: Rgb888) -> Self {
        Self::opaque(color.r(), color.g(), color.b())
    }
}

/// 128x64 RGBA render target
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: [u8; BUFFER_LEN],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Framebuffer")
            .field("width", &WIDTH)
            .field("height", &HEIGHT)
            .finish_non_exhaustive()
    }
}

impl Framebuffer {
    /// Create an opaque black framebuffer
    pub fn new() -> Self {
        let mut fb = Self {
            pixels: [0; BUFFER_LEN],
        };
        fb.clear();
        fb
    }

    pub const fn width(&self) -> usize {
        WIDTH
    }

    pub const fn height(&self) -> usize {
        HEIGHT
    }

    /// Fill with opaque black
    pub fn clear(&mut self) {
        self.fill(Rgba::BLACK);
    }

    /// Fill every pixel with one color
    pub fn fill(&mut self, color: Rgba) {
        for px in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    /// Read a pixel, `None` outside the panel
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        let i = Self::offset(x, y)?;
        let px = &self.pixels[i..i + BYTES_PER_PIXEL];
        Some(Rgba {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        })
    }

    /// Write a pixel; writes outside the panel are ignored
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgba) {
        if let Some(i) = Self::offset(x, y) {
            self.pixels[i..i + BYTES_PER_PIXEL].copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }

    /// Raw RGBA bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable raw RGBA bytes, row-major
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Replace the contents with an RGBA image of exactly the panel size
    pub fn copy_from_rgba(&mut self, src: &[u8], width: usize, height: usize) -> Result<(), ImageError> {
        if width != WIDTH || height != HEIGHT {
            return Err(ImageError::DimensionMismatch);
        }
        if src.len() != BUFFER_LEN {
            return Err(ImageError::BufferSizeMismatch);
        }
        self.pixels.copy_from_slice(src);
        Ok(())
    }

    /// Dither a sub-rectangle to pure black/white in place
    ///
    /// The rectangle is clipped to the panel. Error diffusion stays inside
    /// the (clipped) rectangle, pixels outside it are not touched.
    pub fn dither_region(&mut self, x: usize, y: usize, width: usize, height: usize) {
        let x = x.min(WIDTH);
        let y = y.min(HEIGHT);
        let width = width.min(WIDTH - x);
        let height = height.min(HEIGHT - y);
        dither::dither_strided(&mut self.pixels, WIDTH, x, y, width, height);
    }

    /// Dither the whole panel
    pub fn dither(&mut self) {
        self.dither_region(0, 0, WIDTH, HEIGHT);
    }

    /// Pack into the controller's GDDRAM layout
    pub fn pack(&self) -> PackedFrame {
        PackedFrame::from_framebuffer(self)
    }

    fn offset(x: usize, y: usize) -> Option<usize> {
        if x < WIDTH && y < HEIGHT {
            Some((y * WIDTH + x) * BYTES_PER_PIXEL)
        } else {
            None
        }
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for Framebuffer {
    type Color = Rgb888;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) {
                self.set_pixel(x, y, color.into());
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill(color.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_new_is_opaque_black() {
        let fb = Framebuffer::new();
        assert_eq!(fb.as_bytes().len(), 128 * 64 * 4);
        assert_eq!(fb.pixel(0, 0), Some(Rgba::BLACK));
        assert_eq!(fb.pixel(127, 63), Some(Rgba::BLACK));
        assert_eq!(fb.pixel(128, 0), None);
        assert_eq!(fb.pixel(0, 64), None);
    }

    #[test]
    fn test_set_pixel_out_of_bounds_is_ignored() {
        let mut fb = Framebuffer::new();
        fb.set_pixel(200, 10, Rgba::WHITE);
        assert_eq!(fb, Framebuffer::new());

        fb.set_pixel(3, 5, Rgba::WHITE);
        assert_eq!(fb.pixel(3, 5), Some(Rgba::WHITE));
        // row-major, 4 bytes per pixel
        assert_eq!(fb.as_bytes()[(5 * WIDTH + 3) * 4], 255);
    }

    #[test]
    fn test_draw_target() {
        let mut fb = Framebuffer::new();
        Rectangle::new(Point::new(-2, -2), Size::new(4, 4))
            .into_styled(PrimitiveStyle::with_fill(Rgb888::WHITE))
            .draw(&mut fb)
            .unwrap();

        assert_eq!(fb.pixel(0, 0), Some(Rgba::WHITE));
        assert_eq!(fb.pixel(1, 1), Some(Rgba::WHITE));
        assert_eq!(fb.pixel(2, 2), Some(Rgba::BLACK));
    }

    #[test]
    fn test_copy_from_rgba_checks_dimensions() {
        let mut fb = Framebuffer::new();
        let small = [0u8; 16];
        assert_eq!(
            fb.copy_from_rgba(&small, 2, 2),
            Err(ImageError::DimensionMismatch)
        );
        assert_eq!(
            fb.copy_from_rgba(&small, WIDTH, HEIGHT),
            Err(ImageError::BufferSizeMismatch)
        );

        let white = [255u8; BUFFER_LEN];
        fb.copy_from_rgba(&white, WIDTH, HEIGHT).unwrap();
        assert_eq!(fb.pixel(64, 32), Some(Rgba::WHITE));
    }

    #[test]
    fn test_dither_region_leaves_outside_untouched() {
        let mut fb = Framebuffer::new();
        fb.fill(Rgba::gray(100));
        fb.dither_region(10, 10, 20, 20);

        assert_eq!(fb.pixel(9, 10), Some(Rgba::gray(100)));
        assert_eq!(fb.pixel(30, 10), Some(Rgba::gray(100)));
        assert_eq!(fb.pixel(10, 30), Some(Rgba::gray(100)));
        for y in 10..30 {
            for x in 10..30 {
                let px = fb.pixel(x, y).unwrap();
                assert!(px.r == 0 || px.r == 255);
            }
        }
    }

    #[test]
    fn test_dither_region_is_clipped() {
        let mut fb = Framebuffer::new();
        fb.fill(Rgba::gray(200));
        fb.dither_region(120, 60, 50, 50);

        assert_eq!(fb.pixel(119, 63), Some(Rgba::gray(200)));
        let corner = fb.pixel(127, 63).unwrap();
        assert!(corner.r == 0 || corner.r == 255);
    }
}
