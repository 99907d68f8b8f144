//! Logo screen: an image file scaled to the panel and dithered once

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, RgbaImage};

use ssdpanel_core::{Framebuffer, ImageError, HEIGHT, WIDTH};

use super::{draw_centered, SMALL};

/// A ready-to-show logo frame
#[derive(Debug, Clone)]
pub struct Logo {
    frame: Framebuffer,
}

impl Logo {
    /// Scale an image to the panel, flatten it onto black and dither it
    pub fn from_image(image: &DynamicImage) -> Result<Self, ImageError> {
        let mut scaled = image
            .resize_exact(WIDTH as u32, HEIGHT as u32, FilterType::Triangle)
            .to_rgba8();
        flatten_on_black(&mut scaled);
        let mut frame = Framebuffer::new();
        frame.copy_from_rgba(scaled.as_raw(), WIDTH, HEIGHT)?;
        frame.dither();
        Ok(Self { frame })
    }

    /// Load an image file; the format is taken from its contents
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        log::info!(
            "Loaded logo {} ({}x{})",
            path.display(),
            image.width(),
            image.height()
        );
        Ok(Self::from_image(&image)?)
    }

    /// Load an image file, or fall back to a "no image" placeholder
    pub fn load_or_placeholder(path: &Path) -> Self {
        match Self::load(path) {
            Ok(logo) => logo,
            Err(e) => {
                log::warn!("No logo from {}: {e}", path.display());
                Self::placeholder()
            }
        }
    }

    pub fn placeholder() -> Self {
        let mut frame = Framebuffer::new();
        draw_centered(&mut frame, "no image", SMALL, 36);
        Self { frame }
    }

    pub fn frame(&self) -> &Framebuffer {
        &self.frame
    }

    pub fn draw(&self, fb: &mut Framebuffer) {
        fb.clone_from(self.frame());
    }
}

/// Composite over an opaque black background
fn flatten_on_black(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let scale = |c: u8| (u16::from(c) * u16::from(a) / 255) as u8;
        pixel.0 = [scale(r), scale(g), scale(b), 255];
    }
}
