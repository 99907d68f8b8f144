//! SSD1306 OLED display driver
//!
//! Driver for 128x64 SSD1306-class controllers on I2C. Every transfer starts
//! with a control byte: `0x00` for the command channel, `0x40` for display
//! data. Commands go out one per transaction; display data goes out in
//! blocks of at most [`CHUNK_SIZE`] bytes.
//!
//! The controller is write-only. [`ControllerState`] is what this driver last
//! told it, not something read back. If a transfer fails part-way through an
//! operation the cached state and the hardware may disagree; nothing here
//! retries or resynchronises.

use core::fmt;

use embedded_hal_async::i2c::I2c;
use log::debug;

use ssdpanel_core::gddram::{self, CodecError, PackedFrame, PACKED_LEN};
use ssdpanel_core::{Framebuffer, HEIGHT, PAGE_HEIGHT, WIDTH};
use ssdpanel_hal::i2c::DEFAULT_ADDRESS;

/// Control byte selecting the command channel
pub const MODE_COMMAND: u8 = 0x00;

/// Control byte selecting the data channel
pub const MODE_DATA: u8 = 0x40;

/// Largest data block per bus transaction
pub const CHUNK_SIZE: usize = 32;

/// Number of controller pages
pub const PAGES: usize = HEIGHT / PAGE_HEIGHT;

/// SSD1306 commands
pub mod cmd {
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_MEMORY_MODE: u8 = 0x20;
    pub const SET_COLUMN_ADDR: u8 = 0x21;
    pub const SET_PAGE_ADDR: u8 = 0x22;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const ENTIRE_DISPLAY_RESUME: u8 = 0xA4;
    pub const ENTIRE_DISPLAY_ON: u8 = 0xA5;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_PAGE_START: u8 = 0xB0;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;

    /// Memory addressing mode values for `SET_MEMORY_MODE`
    pub const MODE_HORIZONTAL: u8 = 0b00;
    pub const MODE_VERTICAL: u8 = 0b01;
    pub const MODE_PAGE: u8 = 0b10;
}

/// Contrast programmed by the bring-up sequence
pub const DEFAULT_CONTRAST: u8 = 0xCF;

/// Bring-up sequence, one command byte per transaction.
/// Datasheet-mandated for this panel; keep byte-for-byte.
pub const INIT_SEQUENCE: [u8; 25] = [
    cmd::DISPLAY_OFF,
    cmd::SET_LOW_COLUMN,
    cmd::SET_HIGH_COLUMN,
    cmd::SET_START_LINE,
    cmd::SET_PAGE_START,
    cmd::SET_CONTRAST,
    DEFAULT_CONTRAST,
    cmd::SET_SEG_REMAP,
    cmd::SET_NORMAL,
    cmd::SET_MUX_RATIO,
    0x3F, // 64 lines
    cmd::SET_COM_SCAN_DEC,
    cmd::SET_DISPLAY_OFFSET,
    0x00,
    cmd::SET_CLOCK_DIV,
    0x80,
    cmd::SET_PRECHARGE,
    0xF1,
    cmd::SET_COM_PINS,
    0x12, // Alternative COM config
    cmd::SET_VCOM_DETECT,
    0x40,
    cmd::SET_CHARGE_PUMP,
    0x14, // Enable charge pump
    cmd::DISPLAY_ON,
];

/// GDDRAM addressing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressingMode {
    /// Column counter wraps into the next page
    Horizontal,
    /// Page counter wraps into the next column
    Vertical,
    /// Column counter wraps within one page. Parameters are the lower and
    /// upper column nibbles and the start page.
    Page {
        lower_column: u8,
        upper_column: u8,
        start_page: u8,
    },
}

impl AddressingMode {
    /// Page mode starting at column 0 of page 0
    pub const fn page() -> Self {
        AddressingMode::Page {
            lower_column: 0,
            upper_column: 0,
            start_page: 0,
        }
    }

    const fn mode_bits(self) -> u8 {
        match self {
            AddressingMode::Horizontal => cmd::MODE_HORIZONTAL,
            AddressingMode::Vertical => cmd::MODE_VERTICAL,
            AddressingMode::Page { .. } => cmd::MODE_PAGE,
        }
    }
}

/// What the driver last programmed into the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerState {
    /// Bring-up sequence completed
    pub initialized: bool,
    pub mode: AddressingMode,
    /// Column window (start, end), horizontal/vertical modes
    pub columns: (u8, u8),
    /// Page window (start, end), horizontal/vertical modes
    pub pages: (u8, u8),
    pub display_on: bool,
    pub inverted: bool,
    pub contrast: u8,
}

impl ControllerState {
    /// Power-on reset values
    pub const fn reset() -> Self {
        Self {
            initialized: false,
            mode: AddressingMode::page(),
            columns: (0, (WIDTH - 1) as u8),
            pages: (0, (PAGES - 1) as u8),
            display_on: false,
            inverted: false,
            contrast: 0x7F,
        }
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::reset()
    }
}

/// Display driver errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError<E> {
    /// Bus transaction failed
    Transport(E),
    /// Image could not be packed
    Codec(CodecError),
}

impl<E> From<CodecError> for DisplayError<E> {
    fn from(e: CodecError) -> Self {
        DisplayError::Codec(e)
    }
}

impl<E: fmt::Debug> fmt::Display for DisplayError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::Transport(e) => write!(f, "bus transaction failed: {e:?}"),
            DisplayError::Codec(e) => write!(f, "{e}"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for DisplayError<E> {}

/// SSD1306 OLED driver
///
/// Owns the bus transport exclusively. Each method waits for every write to
/// complete before issuing the next, so operations from one caller reach the
/// controller in program order.
pub struct Ssd1306<I2C> {
    i2c: I2C,
    address: u8,
    state: ControllerState,
}

impl<I2C> Ssd1306<I2C>
where
    I2C: I2c,
{
    /// Create a driver for a controller at the default address
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    /// Create a driver for a controller at `address`
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            state: ControllerState::reset(),
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Cached controller state (advisory, never read back)
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Give the transport back
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Run the bring-up sequence and switch the panel on
    pub async fn initialize(&mut self) -> Result<(), DisplayError<I2C::Error>> {
        self.commands(&INIT_SEQUENCE).await?;

        self.state = ControllerState {
            initialized: true,
            mode: AddressingMode::page(),
            display_on: true,
            inverted: false,
            contrast: DEFAULT_CONTRAST,
            ..ControllerState::reset()
        };
        debug!("SSD1306 at {:#04x} initialized", self.address);
        Ok(())
    }

    /// Select the GDDRAM addressing mode
    ///
    /// Page mode also programs its start column and page; parameters are
    /// masked to the register widths.
    pub async fn set_addressing_mode(
        &mut self,
        mode: AddressingMode,
    ) -> Result<(), DisplayError<I2C::Error>> {
        self.commands(&[cmd::SET_MEMORY_MODE, mode.mode_bits()])
            .await?;

        let mode = match mode {
            AddressingMode::Page {
                lower_column,
                upper_column,
                start_page,
            } => {
                let lower_column = lower_column & 0x0F;
                let upper_column = upper_column & 0x0F;
                let start_page = start_page & 0x07;
                self.commands(&[
                    cmd::SET_LOW_COLUMN | lower_column,
                    cmd::SET_HIGH_COLUMN | upper_column,
                    cmd::SET_PAGE_START | start_page,
                ])
                .await?;
                AddressingMode::Page {
                    lower_column,
                    upper_column,
                    start_page,
                }
            }
            other => other,
        };

        self.state.mode = mode;
        Ok(())
    }

    /// Set the column window (horizontal/vertical modes). Values are masked
    /// to 7 bits, like the hardware register.
    pub async fn set_column_address(
        &mut self,
        start: u8,
        end: u8,
    ) -> Result<(), DisplayError<I2C::Error>> {
        let (start, end) = (start & 0x7F, end & 0x7F);
        self.commands(&[cmd::SET_COLUMN_ADDR, start, end]).await?;
        self.state.columns = (start, end);
        Ok(())
    }

    /// Set the page window (horizontal/vertical modes). Values are masked
    /// to 3 bits, like the hardware register.
    pub async fn set_page_address(
        &mut self,
        start: u8,
        end: u8,
    ) -> Result<(), DisplayError<I2C::Error>> {
        let (start, end) = (start & 0x07, end & 0x07);
        self.commands(&[cmd::SET_PAGE_ADDR, start, end]).await?;
        self.state.pages = (start, end);
        Ok(())
    }

    /// Horizontal mode over the whole panel, ready for a full-frame write
    pub async fn set_full_window(&mut self) -> Result<(), DisplayError<I2C::Error>> {
        self.set_addressing_mode(AddressingMode::Horizontal).await?;
        self.set_column_address(0, (WIDTH - 1) as u8).await?;
        self.set_page_address(0, (PAGES - 1) as u8).await
    }

    /// Set display contrast (0-255)
    pub async fn set_contrast(&mut self, contrast: u8) -> Result<(), DisplayError<I2C::Error>> {
        self.commands(&[cmd::SET_CONTRAST, contrast]).await?;
        self.state.contrast = contrast;
        Ok(())
    }

    /// Invert display colors
    pub async fn set_inverted(&mut self, inverted: bool) -> Result<(), DisplayError<I2C::Error>> {
        let c = if inverted {
            cmd::SET_INVERSE
        } else {
            cmd::SET_NORMAL
        };
        self.command(c).await?;
        self.state.inverted = inverted;
        Ok(())
    }

    /// Turn display on/off
    pub async fn set_display_on(&mut self, on: bool) -> Result<(), DisplayError<I2C::Error>> {
        let c = if on { cmd::DISPLAY_ON } else { cmd::DISPLAY_OFF };
        self.command(c).await?;
        self.state.display_on = on;
        Ok(())
    }

    /// Light every pixel regardless of GDDRAM contents (panel test)
    pub async fn set_entire_display_on(&mut self, on: bool) -> Result<(), DisplayError<I2C::Error>> {
        let c = if on {
            cmd::ENTIRE_DISPLAY_ON
        } else {
            cmd::ENTIRE_DISPLAY_RESUME
        };
        self.command(c).await
    }

    /// Blank the whole GDDRAM
    ///
    /// Display off, full window, zeroes in [`CHUNK_SIZE`] blocks, display on.
    pub async fn clear(&mut self) -> Result<(), DisplayError<I2C::Error>> {
        self.set_display_on(false).await?;
        self.set_full_window().await?;

        let zeros = [0u8; CHUNK_SIZE];
        for _ in 0..PACKED_LEN / CHUNK_SIZE {
            self.data_block(&zeros).await?;
        }

        self.set_display_on(true).await
    }

    /// Pack and write a full framebuffer
    pub async fn draw_frame(&mut self, fb: &Framebuffer) -> Result<(), DisplayError<I2C::Error>> {
        let frame = fb.pack();
        self.write_frame(&frame).await
    }

    /// Pack and write a raw RGBA image of the panel size
    pub async fn draw_image(
        &mut self,
        pixels: &[u8],
        width: usize,
        height: usize,
    ) -> Result<(), DisplayError<I2C::Error>> {
        if width != WIDTH {
            return Err(CodecError::DimensionMismatch.into());
        }
        let mut packed = [0u8; PACKED_LEN];
        let len = gddram::pack(pixels, width, height, &mut packed)?;
        if len != PACKED_LEN {
            return Err(CodecError::DimensionMismatch.into());
        }

        self.set_full_window().await?;
        self.write_data(&packed).await
    }

    /// Write an already packed frame
    pub async fn write_frame(&mut self, frame: &PackedFrame) -> Result<(), DisplayError<I2C::Error>> {
        self.set_full_window().await?;
        self.write_data(frame.as_bytes()).await
    }

    /// Send display data in chunks. Only reachable after a window setup.
    async fn write_data(&mut self, data: &[u8]) -> Result<(), DisplayError<I2C::Error>> {
        for block in data.chunks(CHUNK_SIZE) {
            self.data_block(block).await?;
        }
        Ok(())
    }

    async fn data_block(&mut self, block: &[u8]) -> Result<(), DisplayError<I2C::Error>> {
        let mut buf = [0u8; CHUNK_SIZE + 1];
        buf[0] = MODE_DATA;
        buf[1..=block.len()].copy_from_slice(block);
        self.i2c
            .write(self.address, &buf[..=block.len()])
            .await
            .map_err(DisplayError::Transport)
    }

    /// Send a command to the display
    async fn command(&mut self, c: u8) -> Result<(), DisplayError<I2C::Error>> {
        self.i2c
            .write(self.address, &[MODE_COMMAND, c])
            .await
            .map_err(DisplayError::Transport)
    }

    async fn commands(&mut self, cmds: &[u8]) -> Result<(), DisplayError<I2C::Error>> {
        for &c in cmds {
            self.command(c).await?;
        }
        Ok(())
    }
}
