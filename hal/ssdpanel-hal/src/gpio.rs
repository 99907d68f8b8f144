//! GPIO line abstractions
//!
//! Models the user-space GPIO interface of a Linux board: a line is exported,
//! configured as an input with an interrupt edge, and its value resource is
//! opened for reading and change notification.

use core::fmt;

/// Line direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// Value written to the line's `direction` attribute
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

/// Interrupt edge that produces a change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// No notifications
    #[default]
    None,
    Rising,
    Falling,
    /// Press and release both notify
    Both,
}

impl Edge {
    /// Value written to the line's `edge` attribute
    pub const fn as_str(self) -> &'static str {
        match self {
            Edge::None => "none",
            Edge::Rising => "rising",
            Edge::Falling => "falling",
            Edge::Both => "both",
        }
    }
}

/// Errors from GPIO operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioError {
    /// The line is already exported (left behind by a previous run).
    /// Recoverable: the line can be configured as-is.
    AlreadyExported,
    /// Line or attribute does not exist
    NotFound,
    /// Insufficient permissions on the GPIO interface
    PermissionDenied,
    /// The value resource returned something other than an ASCII digit
    InvalidValue,
    /// Any other I/O failure
    Io,
}

impl GpioError {
    /// Returns true for the conditions a caller may treat as expected
    pub fn is_recoverable(&self) -> bool {
        matches!(self, GpioError::AlreadyExported)
    }
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpioError::AlreadyExported => f.write_str("line already exported"),
            GpioError::NotFound => f.write_str("line or attribute not found"),
            GpioError::PermissionDenied => f.write_str("permission denied"),
            GpioError::InvalidValue => f.write_str("invalid line value"),
            GpioError::Io => f.write_str("i/o error"),
        }
    }
}

impl core::error::Error for GpioError {}

/// User-space GPIO interface
///
/// Every operation is a suspension point. Implementations take `&self` so
/// several line watchers can share one interface.
#[allow(async_fn_in_trait)]
pub trait GpioSysfs {
    /// Open value resource of one line
    type Value: GpioValue;

    /// Export a line to user space
    ///
    /// Returns [`GpioError::AlreadyExported`] if the line is already
    /// exported; callers decide whether that is fatal.
    async fn export(&self, line: u8) -> Result<(), GpioError>;

    /// Set the line direction
    async fn set_direction(&self, line: u8, direction: Direction) -> Result<(), GpioError>;

    /// Set the edge that raises change notifications
    async fn set_edge(&self, line: u8, edge: Edge) -> Result<(), GpioError>;

    /// Open the line's value resource and subscribe to its change notifications
    async fn open_value(&self, line: u8) -> Result<Self::Value, GpioError>;
}

/// Open value resource of an exported line
#[allow(async_fn_in_trait)]
pub trait GpioValue {
    /// Read the raw 1-byte value (ASCII `'0'` or `'1'` on Linux)
    async fn read(&mut self) -> Result<u8, GpioError>;

    /// Wait for the next change notification
    async fn wait_for_change(&mut self) -> Result<(), GpioError>;

    /// Cancel the change subscription and close the handle
    async fn close(self) -> Result<(), GpioError>
    where
        Self: Sized;
}
