//! Grayscale reduction and Floyd-Steinberg dithering
//!
//! The panel has no gray levels, so imported bitmaps are reduced to pure
//! black/white before packing. Both passes run in place on RGBA bytes; the
//! red channel holds the working gray value between the passes.
//!
//! Arithmetic is integer-only so the output is byte-identical on every run
//! and every target. Working values saturate at 0..=255.
//!
//! Error diffusion never leaves the dithered region: neighbours outside
//! `[0, w) x [0, h)` are skipped rather than wrapped into the next row.

use core::fmt;

use crate::framebuffer::BYTES_PER_PIXEL;

/// Quantization threshold: gray values below it become black
pub const THRESHOLD: u8 = 127;

/// Floyd-Steinberg kernel, in sixteenths: (dx, dy, weight)
const KERNEL: [(isize, usize, i16); 4] = [(1, 0, 7), (-1, 1, 3), (0, 1, 5), (1, 1, 1)];

/// Errors for operations on raw RGBA buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ImageError {
    /// Buffer length is not `width * height * 4`
    BufferSizeMismatch,
    /// Image dimensions do not match the target
    DimensionMismatch,
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::BufferSizeMismatch => f.write_str("buffer length does not match dimensions"),
            ImageError::DimensionMismatch => f.write_str("image dimensions do not match target"),
        }
    }
}

impl core::error::Error for ImageError {}

/// Perceptual luminance, `0.30 R + 0.59 G + 0.11 B`, rounded
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let weighted = 30 * u32::from(r) + 59 * u32::from(g) + 11 * u32::from(b);
    ((weighted + 50) / 100) as u8
}

/// Convert a tightly packed RGBA image to gray (R = G = B = luminance)
///
/// Alpha is left untouched.
pub fn grayscale(pixels: &mut [u8], width: usize, height: usize) -> Result<(), ImageError> {
    check_len(pixels, width, height)?;
    for px in pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
        let gray = luminance(px[0], px[1], px[2]);
        px[..3].fill(gray);
    }
    Ok(())
}

/// Dither a tightly packed RGBA image to pure black/white in place
///
/// Every pixel's RGB channels end up all-0 or all-255; alpha is untouched.
pub fn dither(pixels: &mut [u8], width: usize, height: usize) -> Result<(), ImageError> {
    check_len(pixels, width, height)?;
    dither_strided(pixels, width, 0, 0, width, height);
    Ok(())
}

fn check_len(pixels: &[u8], width: usize, height: usize) -> Result<(), ImageError> {
    match width.checked_mul(height).and_then(|n| n.checked_mul(BYTES_PER_PIXEL)) {
        Some(len) if len == pixels.len() => Ok(()),
        _ => Err(ImageError::BufferSizeMismatch),
    }
}

/// Dither the `width x height` region at (`x0`, `y0`) of an image whose rows
/// are `stride` pixels long. The caller clips the region to the image.
pub(crate) fn dither_strided(
    pixels: &mut [u8],
    stride: usize,
    x0: usize,
    y0: usize,
    width: usize,
    height: usize,
) {
    let index = |x: usize, y: usize| ((y0 + y) * stride + x0 + x) * BYTES_PER_PIXEL;

    // Pass 1: luminance into the red channel
    for y in 0..height {
        for x in 0..width {
            let i = index(x, y);
            pixels[i] = luminance(pixels[i], pixels[i + 1], pixels[i + 2]);
        }
    }

    // Pass 2: quantize and diffuse, top-to-bottom, left-to-right
    for y in 0..height {
        for x in 0..width {
            let i = index(x, y);
            let gray = pixels[i];
            let value = if gray < THRESHOLD { 0 } else { 255 };
            pixels[i..i + 3].fill(value);

            let error = i16::from(gray) - i16::from(value);
            if error == 0 {
                continue;
            }

            for (dx, dy, weight) in KERNEL {
                let Some(nx) = x.checked_add_signed(dx) else {
                    continue;
                };
                let ny = y + dy;
                if nx >= width || ny >= height {
                    continue;
                }
                let n = index(nx, ny);
                let diffused = i16::from(pixels[n]) + scale(error, weight);
                pixels[n] = diffused.clamp(0, 255) as u8;
            }
        }
    }
}

/// `error * weight / 16`, rounded half away from zero
fn scale(error: i16, weight: i16) -> i16 {
    let n = error * weight;
    if n >= 0 {
        (n + 8) / 16
    } else {
        (n - 8) / 16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn image(width: usize, height: usize, gray: u8) -> Vec<u8> {
        let mut data = Vec::with_capacity(width * height * 4);
        for _ in 0..width * height {
            data.extend_from_slice(&[gray, gray, gray, 255]);
        }
        data
    }

    #[test]
    fn test_luminance_weights() {
        assert_eq!(luminance(0, 0, 0), 0);
        assert_eq!(luminance(255, 255, 255), 255);
        assert_eq!(luminance(255, 0, 0), 77);
        assert_eq!(luminance(0, 255, 0), 150);
        assert_eq!(luminance(0, 0, 255), 28);
    }

    #[test]
    fn test_grayscale_keeps_alpha() {
        let mut data = vec![255, 0, 0, 42];
        grayscale(&mut data, 1, 1).unwrap();
        assert_eq!(data, vec![77, 77, 77, 42]);
    }

    #[test]
    fn test_threshold() {
        let mut dark = image(1, 1, 126);
        dither(&mut dark, 1, 1).unwrap();
        assert_eq!(dark, vec![0, 0, 0, 255]);

        let mut light = image(1, 1, 127);
        dither(&mut light, 1, 1).unwrap();
        assert_eq!(light, vec![255, 255, 255, 255]);
    }

    #[test]
    fn test_solid_images_are_unchanged() {
        let mut black = image(8, 8, 0);
        dither(&mut black, 8, 8).unwrap();
        assert_eq!(black, image(8, 8, 0));

        let mut white = image(8, 8, 255);
        dither(&mut white, 8, 8).unwrap();
        assert_eq!(white, image(8, 8, 255));
    }

    #[test]
    fn test_mid_gray_is_roughly_half_lit() {
        let (w, h) = (32, 32);
        let mut data = image(w, h, 128);
        dither(&mut data, w, h).unwrap();

        let lit = data.chunks_exact(4).filter(|px| px[0] == 255).count();
        let total = w * h;
        assert!(lit > total * 2 / 5 && lit < total * 3 / 5, "lit = {lit}");
    }

    #[test]
    fn test_error_does_not_wrap_into_next_row() {
        // 1 pixel wide: the right neighbour of (0, 0) does not exist. If it
        // wrapped it would land on (0, 1) and push it over the threshold.
        let mut data = vec![100, 100, 100, 255, 90, 90, 90, 255];
        dither(&mut data, 1, 2).unwrap();
        // (0, 1) only receives 5/16 of 100: 90 + 31 = 121 -> black
        assert_eq!(data, vec![0, 0, 0, 255, 0, 0, 0, 255]);
    }

    #[test]
    fn test_bottom_row_does_not_spill() {
        // Whole buffer is the region; the last row diffuses only rightwards
        let mut data = image(3, 1, 100);
        dither(&mut data, 3, 1).unwrap();
        // 100 -> 0 (err 100, +44); 144 -> 255 (err -111, -49); 51 -> 0
        assert_eq!(
            data,
            vec![0, 0, 0, 255, 255, 255, 255, 255, 0, 0, 0, 255]
        );
    }

    #[test]
    fn test_size_mismatch() {
        let mut data = vec![0u8; 12];
        assert_eq!(dither(&mut data, 2, 2), Err(ImageError::BufferSizeMismatch));
        assert_eq!(grayscale(&mut data, 4, 1), Err(ImageError::BufferSizeMismatch));
    }

    #[test]
    fn test_scale_rounding() {
        assert_eq!(scale(100, 7), 44);
        assert_eq!(scale(-100, 7), -44);
        assert_eq!(scale(8, 1), 1);
        assert_eq!(scale(-8, 1), -1);
        assert_eq!(scale(7, 1), 0);
    }

    fn rgba_image() -> impl Strategy<Value = (usize, usize, Vec<u8>)> {
        (1usize..24, 1usize..24).prop_flat_map(|(w, h)| {
            (
                Just(w),
                Just(h),
                proptest::collection::vec(any::<u8>(), w * h * 4),
            )
        })
    }

    proptest! {
        #[test]
        fn prop_output_is_binary_and_keeps_alpha((w, h, data) in rgba_image()) {
            let mut out = data.clone();
            dither(&mut out, w, h).unwrap();
            for (px, orig) in out.chunks_exact(4).zip(data.chunks_exact(4)) {
                prop_assert!(px[0] == 0 || px[0] == 255);
                prop_assert_eq!(px[0], px[1]);
                prop_assert_eq!(px[1], px[2]);
                prop_assert_eq!(px[3], orig[3]);
            }
        }

        #[test]
        fn prop_dither_is_deterministic((w, h, data) in rgba_image()) {
            let mut a = data.clone();
            let mut b = data;
            dither(&mut a, w, h).unwrap();
            dither(&mut b, w, h).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
