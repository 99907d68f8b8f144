//! GDDRAM packing
//!
//! The controller stores the image as pages of 8 pixel rows. Each byte is one
//! column of a page, bit 0 the topmost row. Bytes are ordered page-major then
//! column-minor, which is exactly how the column/page counters advance in
//! horizontal addressing mode:
//!
//! ```text
//!          col 0   col 1        col w-1
//! page 0  [byte 0][byte 1] ... [byte w-1]      rows 0..8
//! page 1  [byte w]   ...                       rows 8..16
//! ```
//!
//! A pixel is lit when its red channel is non-zero. Dither first if the
//! image is not already black/white.

use core::fmt;

use crate::framebuffer::{Framebuffer, BYTES_PER_PIXEL, HEIGHT, WIDTH};

/// Pixel rows per controller page
pub const PAGE_HEIGHT: usize = 8;

/// Packed size of a full panel frame
pub const PACKED_LEN: usize = WIDTH * HEIGHT / PAGE_HEIGHT;

/// Errors while packing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Height is not a whole number of pages
    HeightNotPageAligned { height: usize },
    /// Pixel buffer length is not `width * height * 4`
    DimensionMismatch,
    /// Output buffer cannot hold the packed frame
    BufferTooSmall { needed: usize },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::HeightNotPageAligned { height } => {
                write!(f, "height {height} is not a multiple of {PAGE_HEIGHT}")
            }
            CodecError::DimensionMismatch => f.write_str("pixel buffer does not match dimensions"),
            CodecError::BufferTooSmall { needed } => {
                write!(f, "output buffer too small, {needed} bytes needed")
            }
        }
    }
}

impl core::error::Error for CodecError {}

/// Packed size of a `width x height` image (height already page aligned)
pub const fn packed_len(width: usize, height: usize) -> usize {
    width * (height / PAGE_HEIGHT)
}

/// Pack an RGBA image into GDDRAM format
///
/// Writes `packed_len(width, height)` bytes to the front of `out` and returns
/// that length. Fails without writing anything if the height is not a
/// multiple of 8 or the buffers do not match the dimensions.
pub fn pack(pixels: &[u8], width: usize, height: usize, out: &mut [u8]) -> Result<usize, CodecError> {
    if height % PAGE_HEIGHT != 0 {
        return Err(CodecError::HeightNotPageAligned { height });
    }
    if width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
        != Some(pixels.len())
    {
        return Err(CodecError::DimensionMismatch);
    }

    let needed = packed_len(width, height);
    if out.len() < needed {
        return Err(CodecError::BufferTooSmall { needed });
    }

    pack_pages(pixels, width, height, &mut out[..needed]);
    Ok(needed)
}

fn pack_pages(pixels: &[u8], width: usize, height: usize, out: &mut [u8]) {
    for page in 0..height / PAGE_HEIGHT {
        let top = page * PAGE_HEIGHT;
        for x in 0..width {
            let mut byte = 0u8;
            for bit in 0..PAGE_HEIGHT {
                let i = ((top + bit) * width + x) * BYTES_PER_PIXEL;
                if pixels[i] != 0 {
                    byte |= 1 << bit;
                }
            }
            out[page * width + x] = byte;
        }
    }
}

/// A full panel frame in GDDRAM format
///
/// Always produced fresh from a framebuffer; never edited in place.
#[derive(Clone, PartialEq, Eq)]
pub struct PackedFrame {
    bytes: [u8; PACKED_LEN],
}

impl fmt::Debug for PackedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackedFrame")
            .field("len", &PACKED_LEN)
            .finish_non_exhaustive()
    }
}

impl PackedFrame {
    /// Pack a framebuffer; panel dimensions are always page aligned
    pub fn from_framebuffer(fb: &Framebuffer) -> Self {
        let mut bytes = [0u8; PACKED_LEN];
        pack_pages(fb.as_bytes(), WIDTH, HEIGHT, &mut bytes);
        Self { bytes }
    }

    /// An all-dark frame
    pub const fn blank() -> Self {
        Self {
            bytes: [0; PACKED_LEN],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl AsRef<[u8]> for PackedFrame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
