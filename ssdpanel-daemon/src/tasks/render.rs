//! Render loop
//!
//! Draws the current screen every tick, packs it and writes it to the panel
//! only when it differs from what the panel already shows.

use core::fmt;

use embassy_time::{Duration, Ticker};
use embedded_hal_async::i2c::I2c;

use ssdpanel_core::{FrameCache, Framebuffer};
use ssdpanel_drivers::display::Ssd1306;

use super::ScreenSignal;
use crate::screens::{Screen, Screens};

/// Consecutive failed frame writes before the panel is considered gone
pub const MAX_CONSECUTIVE_FAILURES: u32 = 30;

/// Why the daemon stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Frame writes kept failing
    DisplayLost { failures: u32 },
}

impl ExitReason {
    pub fn exit_code(self) -> i32 {
        match self {
            ExitReason::DisplayLost { .. } => 2,
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::DisplayLost { failures } => {
                write!(f, "display lost after {failures} failed frame writes")
            }
        }
    }
}

/// Owns the panel and everything drawn on it
pub struct Renderer<I2C> {
    display: Ssd1306<I2C>,
    screens: Screens,
    fb: Framebuffer,
    cache: FrameCache,
    current: Screen,
    failures: u32,
}

impl<I2C: I2c> Renderer<I2C> {
    /// Start with a freshly cleared panel
    pub fn new(display: Ssd1306<I2C>, screens: Screens, initial: Screen) -> Self {
        Self {
            display,
            screens,
            fb: Framebuffer::new(),
            cache: FrameCache::cleared(),
            current: initial,
            failures: 0,
        }
    }

    pub fn current(&self) -> Screen {
        self.current
    }

    pub fn select(&mut self, screen: Screen) {
        if screen != self.current {
            log::info!("Showing {screen}");
            self.current = screen;
        }
    }

    /// Render one frame and write it if it changed
    ///
    /// A failed write is retried with the next frame. Returns an exit reason
    /// once [`MAX_CONSECUTIVE_FAILURES`] writes in a row have failed.
    pub async fn step(&mut self) -> Result<(), ExitReason> {
        self.screens.render(self.current, &mut self.fb);
        let frame = self.fb.pack();
        if !self.cache.is_dirty(&frame) {
            return Ok(());
        }

        match self.display.write_frame(&frame).await {
            Ok(()) => {
                self.cache.mark_written(frame);
                self.failures = 0;
                Ok(())
            }
            Err(e) => {
                self.cache.invalidate();
                self.failures += 1;
                log::warn!(
                    "Frame write failed ({}/{MAX_CONSECUTIVE_FAILURES}): {e}",
                    self.failures
                );
                if self.failures >= MAX_CONSECUTIVE_FAILURES {
                    Err(ExitReason::DisplayLost {
                        failures: self.failures,
                    })
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Render at `frame_rate` Hz until the display is lost
pub async fn render_loop<I2C: I2c>(
    renderer: &mut Renderer<I2C>,
    selected: &ScreenSignal,
    frame_rate: u32,
) -> ExitReason {
    log::info!("Render loop started at {frame_rate} Hz");
    let mut ticker = Ticker::every(Duration::from_hz(u64::from(frame_rate.max(1))));

    loop {
        if let Some(screen) = selected.try_take() {
            renderer.select(screen);
        }
        if let Err(reason) = renderer.step().await {
            return reason;
        }
        ticker.next().await;
    }
}
