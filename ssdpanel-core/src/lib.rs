//! Board-agnostic core of the ssdpanel status display
//!
//! This crate contains the pure, I/O-free parts of the panel pipeline:
//!
//! - [`framebuffer`]: the 128x64 RGBA render target (an `embedded-graphics`
//!   `DrawTarget`)
//! - [`dither`]: grayscale reduction and Floyd-Steinberg error diffusion down
//!   to pure black/white
//! - [`gddram`]: packing a black/white framebuffer into the controller's
//!   page-addressed 1 bit per pixel layout
//! - [`event`]: key events produced by the input layer
//! - [`cache`]: last-written frame, so unchanged frames are never resent
//!
//! # Pipeline
//!
//! ```text
//! rasterizer ─► Framebuffer ─► dither (imported bitmaps only)
//!                    │
//!                    ▼
//!               gddram::pack ─► FrameCache ─► display driver
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod cache;
pub mod dither;
pub mod event;
pub mod framebuffer;
pub mod gddram;

pub use cache::FrameCache;
pub use dither::{dither, grayscale, ImageError};
pub use event::{Key, KeyEvent, KeyKind};
pub use framebuffer::{Framebuffer, Rgba, HEIGHT, WIDTH};
pub use gddram::{pack, packed_len, CodecError, PackedFrame, PAGE_HEIGHT};
