//! Linux HAL for the ssdpanel daemon
//!
//! Implements the `ssdpanel-hal` traits on top of the kernel's user-space
//! interfaces:
//!
//! - [`gpio::SysfsGpio`] - `/sys/class/gpio` export/direction/edge attributes,
//!   with change notifications delivered by a per-line poller thread
//! - [`i2c::BlockingI2c`] - async I2C over `/dev/i2c-N`, completing each
//!   transaction inline

pub mod gpio;
pub mod i2c;

pub use gpio::{SysfsGpio, SysfsValue, DEFAULT_ROOT};
pub use i2c::{i2c_device_path, open_i2c, BlockingI2c};
