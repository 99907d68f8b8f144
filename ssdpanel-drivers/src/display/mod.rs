//! Display drivers

mod ssd1306;

pub use ssd1306::{
    cmd, AddressingMode, ControllerState, DisplayError, Ssd1306, CHUNK_SIZE, DEFAULT_CONTRAST,
    INIT_SEQUENCE, MODE_COMMAND, MODE_DATA, PAGES,
};
