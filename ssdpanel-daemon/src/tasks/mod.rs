//! Daemon loops
//!
//! All loops run concurrently on the main executor task and talk through
//! `embassy-sync` primitives:
//!
//! ```text
//! watch_line ×N ─► InputEventSource ─► input_loop ─► ScreenSignal ─► render_loop ─► SSD1306
//!      ▲                                                                   │
//!      └──────────────────── StopSignal (shutdown) ◄───────────────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::screens::Screen;

pub mod input;
pub mod render;
pub mod watcher;

pub use input::input_loop;
pub use render::{render_loop, ExitReason, Renderer};
pub use watcher::watch_line;

/// Latest screen selection; the render loop takes it on its next tick
pub type ScreenSignal = Signal<CriticalSectionRawMutex, Screen>;

/// Tells one line watcher to close its line and return
pub type StopSignal = Signal<CriticalSectionRawMutex, ()>;
