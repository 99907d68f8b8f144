//! Consumer side of an input event source

use core::fmt;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::pubsub::{Subscriber, WaitResult};

use ssdpanel_core::{KeyEvent, KeyKind};

use super::{EVENT_CAPACITY, MAX_SUBSCRIBERS, MAX_WATCHERS};

type KeyEventSubscriber<'a, M> =
    Subscriber<'a, M, KeyEvent, EVENT_CAPACITY, MAX_SUBSCRIBERS, MAX_WATCHERS>;

/// Errors from reading an event queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventQueueError {
    /// The queue fell behind and this many events were discarded.
    /// Reading can continue with the oldest event still buffered.
    Lagged(u64),
}

impl fmt::Display for EventQueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventQueueError::Lagged(n) => write!(f, "event queue lagged, {n} events lost"),
        }
    }
}

impl core::error::Error for EventQueueError {}

/// Ordered stream of key events for a single consumer
///
/// Events are delivered in the order they were published. Only the kinds
/// requested when the queue was created are returned; others are skipped.
///
/// The queue is bounded: at most [`EVENT_CAPACITY`] events are buffered per
/// source. A reader that falls further behind loses the oldest events and is
/// told how many with [`EventQueueError::Lagged`] on its next read.
pub struct EventQueue<'a, M: RawMutex> {
    subscriber: KeyEventSubscriber<'a, M>,
    keydown: bool,
    keyup: bool,
}

impl<'a, M: RawMutex> EventQueue<'a, M> {
    pub(crate) fn new(subscriber: KeyEventSubscriber<'a, M>, kinds: &[KeyKind]) -> Self {
        Self {
            subscriber,
            keydown: kinds.contains(&KeyKind::KeyDown),
            keyup: kinds.contains(&KeyKind::KeyUp),
        }
    }

    /// Check if the queue delivers events of this kind
    pub fn accepts(&self, kind: KeyKind) -> bool {
        match kind {
            KeyKind::KeyDown => self.keydown,
            KeyKind::KeyUp => self.keyup,
        }
    }

    /// Next event, waiting for one if none is buffered
    pub async fn next_event(&mut self) -> Result<KeyEvent, EventQueueError> {
        loop {
            match self.subscriber.next_message().await {
                WaitResult::Message(event) if self.accepts(event.kind) => return Ok(event),
                WaitResult::Message(_) => continue,
                WaitResult::Lagged(n) => return Err(EventQueueError::Lagged(n)),
            }
        }
    }

    /// Next buffered event, without waiting
    pub fn try_next_event(&mut self) -> Option<Result<KeyEvent, EventQueueError>> {
        loop {
            match self.subscriber.try_next_message()? {
                WaitResult::Message(event) if self.accepts(event.kind) => return Some(Ok(event)),
                WaitResult::Message(_) => continue,
                WaitResult::Lagged(n) => return Some(Err(EventQueueError::Lagged(n))),
            }
        }
    }

    /// Number of buffered events, including kinds this queue skips
    pub fn pending(&self) -> u64 {
        self.subscriber.available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::mock::MockGpio;
    use crate::input::InputEventSource;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use ssdpanel_core::Key;

    #[test]
    fn test_accepts() {
        let source = InputEventSource::<NoopRawMutex>::new();
        let ups = source.create_event_queue(&[KeyKind::KeyUp]).unwrap();
        assert!(ups.accepts(KeyKind::KeyUp));
        assert!(!ups.accepts(KeyKind::KeyDown));

        let none = source.create_event_queue(&[]).unwrap();
        assert!(!none.accepts(KeyKind::KeyUp));
    }

    #[test]
    fn test_pending_counts_skipped_kinds() {
        let source = InputEventSource::<NoopRawMutex>::new();
        let gpio = MockGpio::new().with_changes(0, b"01");

        block_on(async {
            let mut ups = source.create_event_queue(&[KeyKind::KeyUp]).unwrap();
            let mut watcher = source.watch(&gpio, 0).await.unwrap();
            watcher.next_event().await.unwrap();
            watcher.next_event().await.unwrap();

            assert_eq!(ups.pending(), 2);
            assert_eq!(ups.try_next_event(), Some(Ok(KeyEvent::keyup(Key::F1))));
            assert_eq!(ups.pending(), 0);
            assert_eq!(ups.try_next_event(), None);
        });
    }

    #[test]
    fn test_lag_display() {
        assert_eq!(
            EventQueueError::Lagged(3).to_string(),
            "event queue lagged, 3 events lost"
        );
    }
}
