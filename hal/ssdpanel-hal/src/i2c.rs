//! I2C bus configuration
//!
//! The transport itself is `embedded_hal_async::i2c::I2c`. This module only
//! describes where the display controller lives.

/// Default 7-bit address of SSD1306-class controllers (SA0 low)
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Alternate address (SA0 high)
pub const ALTERNATE_ADDRESS: u8 = 0x3D;

/// I2C configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// Bus number (`/dev/i2c-N` on Linux)
    pub bus: u8,
    /// 7-bit device address
    pub address: u8,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            bus: 0,
            address: DEFAULT_ADDRESS,
        }
    }
}

impl I2cConfig {
    /// Create a config for the given bus at the default address
    pub const fn on_bus(bus: u8) -> Self {
        Self {
            bus,
            address: DEFAULT_ADDRESS,
        }
    }

    /// Use a different device address; masked to 7 bits
    pub const fn with_address(self, address: u8) -> Self {
        Self {
            bus: self.bus,
            address: address & 0x7F,
        }
    }
}
