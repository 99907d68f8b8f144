//! Per-line GPIO watcher

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::pubsub::Publisher;

use ssdpanel_core::{Key, KeyEvent};
use ssdpanel_hal::{Direction, Edge, GpioSysfs, GpioValue};

use super::{InputError, LineOp, EVENT_CAPACITY, MAX_SUBSCRIBERS, MAX_WATCHERS};

type KeyEventPublisher<'a, M> =
    Publisher<'a, M, KeyEvent, EVENT_CAPACITY, MAX_SUBSCRIBERS, MAX_WATCHERS>;

/// A configured GPIO line publishing key events
///
/// Obtained from [`InputEventSource::watch`](super::InputEventSource::watch).
/// Dropping a watcher stops publishing but leaves the line configured; call
/// [`close`](Self::close) to disable its interrupt edge.
pub struct LineWatcher<'a, M: RawMutex, G: GpioSysfs> {
    gpio: &'a G,
    line: u8,
    key: Key,
    value: G::Value,
    publisher: KeyEventPublisher<'a, M>,
}

impl<'a, M: RawMutex, G: GpioSysfs> LineWatcher<'a, M, G> {
    pub(crate) async fn open(
        gpio: &'a G,
        line: u8,
        publisher: KeyEventPublisher<'a, M>,
    ) -> Result<Self, InputError> {
        match gpio.export(line).await {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => {
                log::debug!("gpio{line}: already exported, reusing");
            }
            Err(e) => return Err(InputError::gpio(line, LineOp::Export, e)),
        }

        gpio.set_direction(line, Direction::In)
            .await
            .map_err(|e| InputError::gpio(line, LineOp::Direction, e))?;
        gpio.set_edge(line, Edge::Both)
            .await
            .map_err(|e| InputError::gpio(line, LineOp::Edge, e))?;
        let value = gpio
            .open_value(line)
            .await
            .map_err(|e| InputError::gpio(line, LineOp::OpenValue, e))?;

        let key = Key::from_line(line);
        log::info!("gpio{line}: watching as {key}");

        Ok(Self {
            gpio,
            line,
            key,
            value,
            publisher,
        })
    }

    pub fn line(&self) -> u8 {
        self.line
    }

    /// Key reported by this line
    pub fn key(&self) -> Key {
        self.key
    }

    /// Wait for one change notification and publish the resulting event
    ///
    /// The value is re-read after every notification, so two notifications
    /// that race with a single read both report the level at read time.
    pub async fn next_event(&mut self) -> Result<KeyEvent, InputError> {
        self.value
            .wait_for_change()
            .await
            .map_err(|e| InputError::gpio(self.line, LineOp::WaitForChange, e))?;
        let byte = self
            .value
            .read()
            .await
            .map_err(|e| InputError::gpio(self.line, LineOp::ReadValue, e))?;

        let event = KeyEvent::from_line_value(self.line, byte);
        log::trace!("gpio{}: {}", self.line, event);
        self.publisher.publish_immediate(event);
        Ok(event)
    }

    /// Publish events until the line fails
    pub async fn run(&mut self) -> InputError {
        loop {
            if let Err(e) = self.next_event().await {
                return e;
            }
        }
    }

    /// Stop notifications and release the line's value resource
    ///
    /// The edge is reset to `none` even when closing the value fails.
    /// Failures are logged; the line is left exported.
    pub async fn close(self) {
        let line = self.line;
        if let Err(e) = self.value.close().await {
            log::warn!("gpio{line}: closing value failed: {e}");
        }
        if let Err(e) = self.gpio.set_edge(line, Edge::None).await {
            log::warn!("gpio{line}: resetting edge failed: {e}");
        }
    }
}

impl<M: RawMutex, G: GpioSysfs> core::fmt::Debug for LineWatcher<'_, M, G> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LineWatcher")
            .field("line", &self.line)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::mock::{Call, MockGpio};
    use crate::input::InputEventSource;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use ssdpanel_hal::GpioError;

    #[test]
    fn test_close_resets_edge() {
        let source = InputEventSource::<NoopRawMutex>::new();
        let gpio = MockGpio::new();

        block_on(async {
            let watcher = source.watch(&gpio, 3).await.unwrap();
            watcher.close().await;
        });

        let calls = gpio.calls();
        assert_eq!(
            &calls[calls.len() - 2..],
            &[Call::Close(3), Call::Edge(3, Edge::None)]
        );
    }

    #[test]
    fn test_close_resets_edge_when_value_close_fails() {
        let source = InputEventSource::<NoopRawMutex>::new();
        let gpio = MockGpio::new().with_close_error(GpioError::Io);

        block_on(async {
            let watcher = source.watch(&gpio, 0).await.unwrap();
            watcher.close().await;
        });

        assert_eq!(gpio.calls().last(), Some(&Call::Edge(0, Edge::None)));
    }

    #[test]
    fn test_run_returns_error_after_publishing() {
        let source = InputEventSource::<NoopRawMutex>::new();
        let gpio = MockGpio::new().with_changes(2, b"01");

        block_on(async {
            let mut queue = source.subscribe().unwrap();
            let mut watcher = source.watch(&gpio, 2).await.unwrap();

            // script exhausted after two changes
            let error = watcher.run().await;
            assert_eq!(
                error,
                InputError::Gpio {
                    line: 2,
                    op: LineOp::WaitForChange,
                    error: GpioError::Io,
                }
            );
            assert_eq!(queue.next_event().await, Ok(KeyEvent::keydown(Key::F2)));
            assert_eq!(queue.next_event().await, Ok(KeyEvent::keyup(Key::F2)));
        });
    }

    #[test]
    fn test_read_failure() {
        let source = InputEventSource::<NoopRawMutex>::new();
        let gpio = MockGpio::new()
            .with_changes(0, b"0")
            .with_read_error(GpioError::InvalidValue);

        block_on(async {
            let mut watcher = source.watch(&gpio, 0).await.unwrap();
            assert_eq!(
                watcher.next_event().await,
                Err(InputError::gpio(0, LineOp::ReadValue, GpioError::InvalidValue))
            );
        });
    }
}
