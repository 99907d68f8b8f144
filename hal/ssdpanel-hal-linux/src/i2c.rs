//! I2C over `/dev/i2c-N`

use embedded_hal::i2c::{ErrorType, I2c as BlockingBus, Operation};
use linux_embedded_hal::i2cdev::linux::LinuxI2CError;
use linux_embedded_hal::I2cdev;

use ssdpanel_hal::I2cConfig;

/// Async I2C over a blocking bus
///
/// Each transaction runs to completion inside the poll that starts it. The
/// kernel driver is fast enough at the panel's transfer sizes that nothing
/// else on the executor notices.
#[derive(Debug)]
pub struct BlockingI2c<T> {
    inner: T,
}

impl<T> BlockingI2c<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: ErrorType> ErrorType for BlockingI2c<T> {
    type Error = T::Error;
}

impl<T: BlockingBus> embedded_hal_async::i2c::I2c for BlockingI2c<T> {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.inner.transaction(address, operations)
    }
}

/// Device node of a bus number
pub fn i2c_device_path(bus: u8) -> String {
    format!("/dev/i2c-{bus}")
}

/// Open the bus named by the config
pub fn open_i2c(config: &I2cConfig) -> Result<BlockingI2c<I2cdev>, LinuxI2CError> {
    let path = i2c_device_path(config.bus);
    log::debug!("opening {path}");
    I2cdev::new(path).map(BlockingI2c::new)
}
