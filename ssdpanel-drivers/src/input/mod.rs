//! Key input from edge-triggered GPIO lines
//!
//! Each push-button line gets a [`LineWatcher`] that exports the line,
//! configures it for interrupts on both edges and turns every change
//! notification into a [`KeyEvent`]. All watchers of one
//! [`InputEventSource`] publish into a single ordered stream that any number
//! of [`EventQueue`] consumers (up to [`MAX_SUBSCRIBERS`]) read from.
//!
//! ```text
//! gpio0 ─► LineWatcher ─┐
//! gpio2 ─► LineWatcher ─┼─► InputEventSource ─┬─► EventQueue (keydown only)
//! gpio3 ─► LineWatcher ─┘                     └─► EventQueue (all kinds)
//! ```
//!
//! Events from one line arrive in interrupt order. Nothing is promised about
//! the relative order of events from different lines beyond that.

use core::fmt;

use embassy_sync::pubsub::PubSubChannel;

use ssdpanel_core::KeyEvent;
use ssdpanel_hal::GpioError;

mod queue;
mod source;
mod watcher;

pub use queue::{EventQueue, EventQueueError};
pub use source::InputEventSource;
pub use watcher::LineWatcher;

/// Events buffered per consumer before the slowest one starts lagging
pub const EVENT_CAPACITY: usize = 16;

/// Maximum number of event queues per source
pub const MAX_SUBSCRIBERS: usize = 4;

/// Maximum number of watched lines per source
pub const MAX_WATCHERS: usize = 4;

pub(crate) type KeyEventChannel<M> =
    PubSubChannel<M, KeyEvent, EVENT_CAPACITY, MAX_SUBSCRIBERS, MAX_WATCHERS>;

/// GPIO operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineOp {
    Export,
    Direction,
    Edge,
    OpenValue,
    WaitForChange,
    ReadValue,
}

/// Input errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputError {
    /// A GPIO operation on a line failed; the line's watcher is unusable
    Gpio {
        line: u8,
        op: LineOp,
        error: GpioError,
    },
    /// Every publisher slot of the source is taken
    TooManyWatchers,
    /// Every subscriber slot of the source is taken
    TooManySubscribers,
}

impl InputError {
    pub(crate) fn gpio(line: u8, op: LineOp, error: GpioError) -> Self {
        InputError::Gpio { line, op, error }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Gpio { line, op, error } => {
                write!(f, "gpio{line}: {op:?} failed: {error}")
            }
            InputError::TooManyWatchers => {
                write!(f, "at most {MAX_WATCHERS} lines can be watched")
            }
            InputError::TooManySubscribers => {
                write!(f, "at most {MAX_SUBSCRIBERS} event queues can be created")
            }
        }
    }
}

impl core::error::Error for InputError {}

#[cfg(test)]
mod mock;
