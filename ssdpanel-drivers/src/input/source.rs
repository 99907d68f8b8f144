//! Aggregated key event source

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::pubsub::PubSubChannel;

use ssdpanel_core::KeyKind;
use ssdpanel_hal::GpioSysfs;

use super::{EventQueue, InputError, KeyEventChannel, LineWatcher};

/// Fan-in of line watchers, fan-out to event queues
///
/// Constructed explicitly and passed to whatever needs it; there is no
/// process-wide instance.
pub struct InputEventSource<M: RawMutex> {
    events: KeyEventChannel<M>,
}

impl<M: RawMutex> Default for InputEventSource<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> InputEventSource<M> {
    /// Create a source with no lines and no consumers
    pub const fn new() -> Self {
        Self {
            events: PubSubChannel::new(),
        }
    }

    /// Start watching a GPIO line
    ///
    /// Exports the line (an already exported line is reused), configures it
    /// as an input interrupting on both edges and opens its value. Any other
    /// failure is returned; the line is then not watched.
    pub async fn watch<'a, G: GpioSysfs>(
        &'a self,
        gpio: &'a G,
        line: u8,
    ) -> Result<LineWatcher<'a, M, G>, InputError> {
        let publisher = self
            .events
            .publisher()
            .map_err(|_| InputError::TooManyWatchers)?;
        LineWatcher::open(gpio, line, publisher).await
    }

    /// Consumer receiving every key event
    pub fn subscribe(&self) -> Result<EventQueue<'_, M>, InputError> {
        self.create_event_queue(&KeyKind::ALL)
    }

    /// Consumer receiving only the given kinds of key event
    ///
    /// The queue sees events published after it was created.
    pub fn create_event_queue(&self, kinds: &[KeyKind]) -> Result<EventQueue<'_, M>, InputError> {
        let subscriber = self
            .events
            .subscriber()
            .map_err(|_| InputError::TooManySubscribers)?;
        Ok(EventQueue::new(subscriber, kinds))
    }
}
