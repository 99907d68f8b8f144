//! Per-line watcher loop

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;

use ssdpanel_drivers::input::LineWatcher;
use ssdpanel_hal::GpioSysfs;

use super::StopSignal;

/// Publish key events from one line until it fails or `stop` is signaled,
/// then close the line
///
/// An empty slot returns immediately.
pub async fn watch_line<M: RawMutex, G: GpioSysfs>(
    watcher: Option<LineWatcher<'_, M, G>>,
    stop: &StopSignal,
) {
    let Some(mut watcher) = watcher else {
        return;
    };

    let outcome = select(watcher.run(), stop.wait()).await;
    match outcome {
        Either::First(e) => log::error!("{} stopped: {e}", watcher.key()),
        Either::Second(()) => log::debug!("{} stopping", watcher.key()),
    }
    watcher.close().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use ssdpanel_drivers::input::InputEventSource;
    use ssdpanel_hal::{Direction, Edge, GpioError, GpioValue};
    use std::cell::RefCell;
    use std::future::pending;

    /// Lines that never change; records edge settings and closes
    #[derive(Default)]
    struct IdleGpio {
        log: RefCell<Vec<String>>,
        fail_wait: bool,
    }

    struct IdleValue {
        fail_wait: bool,
    }

    impl GpioSysfs for IdleGpio {
        type Value = IdleValue;

        async fn export(&self, _line: u8) -> Result<(), GpioError> {
            Ok(())
        }

        async fn set_direction(&self, _line: u8, _direction: Direction) -> Result<(), GpioError> {
            Ok(())
        }

        async fn set_edge(&self, line: u8, edge: Edge) -> Result<(), GpioError> {
            self.log.borrow_mut().push(format!("gpio{line} edge {}", edge.as_str()));
            Ok(())
        }

        async fn open_value(&self, _line: u8) -> Result<IdleValue, GpioError> {
            Ok(IdleValue {
                fail_wait: self.fail_wait,
            })
        }
    }

    impl GpioValue for IdleValue {
        async fn read(&mut self) -> Result<u8, GpioError> {
            Ok(b'1')
        }

        async fn wait_for_change(&mut self) -> Result<(), GpioError> {
            if self.fail_wait {
                return Err(GpioError::Io);
            }
            pending().await
        }

        async fn close(self) -> Result<(), GpioError> {
            Ok(())
        }
    }

    #[test]
    fn test_stop_closes_line() {
        let source = InputEventSource::<NoopRawMutex>::new();
        let gpio = IdleGpio::default();
        let stop = StopSignal::new();

        block_on(async {
            let watcher = source.watch(&gpio, 2).await.unwrap();
            join(watch_line(Some(watcher), &stop), async { stop.signal(()) }).await;
        });

        assert_eq!(
            gpio.log.borrow().as_slice(),
            ["gpio2 edge both", "gpio2 edge none"]
        );
    }

    #[test]
    fn test_failed_line_is_closed() {
        let source = InputEventSource::<NoopRawMutex>::new();
        let gpio = IdleGpio {
            fail_wait: true,
            ..Default::default()
        };
        let stop = StopSignal::new();

        block_on(async {
            let watcher = source.watch(&gpio, 0).await.unwrap();
            watch_line(Some(watcher), &stop).await;
        });

        assert_eq!(gpio.log.borrow().last().map(String::as_str), Some("gpio0 edge none"));
    }

    #[test]
    fn test_empty_slot() {
        let stop = StopSignal::new();
        block_on(watch_line::<NoopRawMutex, IdleGpio>(None, &stop));
    }
}
