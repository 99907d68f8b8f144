//! Hardware driver implementations
//!
//! This crate provides the drivers the panel daemon is built from:
//!
//! - Display drivers (SSD1306 over async I2C)
//! - Key input (edge-triggered GPIO lines fanned out as typed key events)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod display;
pub mod input;
