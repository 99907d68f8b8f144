//! ssdpanel Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the panel drivers are
//! written against. Platform crates implement them; the drivers never touch
//! a file descriptor or a bus device directly.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  ssdpanel-daemon (render loop, screens) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ssdpanel-drivers (Ssd1306, key input)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ssdpanel-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ssdpanel-hal-linux (sysfs, /dev/i2c-N) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::GpioSysfs`], [`gpio::GpioValue`] - Edge-triggered GPIO lines
//!   managed through an export/configure/open-value interface
//! - The I2C transport is `embedded_hal_async::i2c::I2c`; [`i2c::I2cConfig`]
//!   only carries where to find the controller

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;

// Re-export key traits at crate root for convenience
pub use gpio::{Direction, Edge, GpioError, GpioSysfs, GpioValue};
pub use i2c::I2cConfig;
