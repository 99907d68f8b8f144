//! sysfs GPIO interface
//!
//! Attributes are plain file writes under the GPIO root. Change notification
//! needs `poll(POLLPRI)` on the value file, which blocks, so every opened
//! value gets a poller thread that forwards wake-ups into an async channel.
//! The thread starts when the value is opened, so edges that arrive before
//! the first wait are kept.

use std::fs::{self, File};
use std::io;
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use linux_embedded_hal::sysfs_gpio;

use ssdpanel_hal::{Direction, Edge, GpioError, GpioSysfs, GpioValue};

/// Kernel GPIO root
pub const DEFAULT_ROOT: &str = "/sys/class/gpio";

/// Poller wake-up interval; bounds how long a closed line's thread lingers
const POLL_TIMEOUT_MS: isize = 100;

/// Notifications buffered between the poller thread and the reader
const NOTIFY_DEPTH: usize = 8;

/// errno for "device or resource busy", returned when exporting twice
const EBUSY: i32 = 16;

type Notifications = Channel<CriticalSectionRawMutex, Result<(), GpioError>, NOTIFY_DEPTH>;

fn map_io(e: &io::Error) -> GpioError {
    if e.raw_os_error() == Some(EBUSY) {
        return GpioError::AlreadyExported;
    }
    match e.kind() {
        io::ErrorKind::NotFound => GpioError::NotFound,
        io::ErrorKind::PermissionDenied => GpioError::PermissionDenied,
        _ => GpioError::Io,
    }
}

fn map_sysfs(e: &sysfs_gpio::Error) -> GpioError {
    match e {
        sysfs_gpio::Error::Io(e) => map_io(e),
        _ => GpioError::Io,
    }
}

fn write_attr(path: &Path, value: &str) -> Result<(), GpioError> {
    fs::write(path, value).map_err(|e| {
        log::trace!("{}: write {value:?} failed: {e}", path.display());
        map_io(&e)
    })
}

/// The sysfs GPIO interface
#[derive(Debug, Clone)]
pub struct SysfsGpio {
    root: PathBuf,
    notify: bool,
}

impl Default for SysfsGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl SysfsGpio {
    /// Interface at [`DEFAULT_ROOT`]
    pub fn new() -> Self {
        Self::with_root(DEFAULT_ROOT)
    }

    /// Interface with attributes and values under another directory
    ///
    /// Change notifications are always taken from the kernel's
    /// `/sys/class/gpio/gpioN/value`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            notify: true,
        }
    }

    /// Open values without a poller thread
    ///
    /// [`wait_for_change`](GpioValue::wait_for_change) on such a value fails
    /// with [`GpioError::Io`]; only [`read`](GpioValue::read) is usable.
    pub fn without_notifications(mut self) -> Self {
        self.notify = false;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn line_attr(&self, line: u8, attr: &str) -> PathBuf {
        self.root.join(format!("gpio{line}")).join(attr)
    }
}

impl GpioSysfs for SysfsGpio {
    type Value = SysfsValue;

    async fn export(&self, line: u8) -> Result<(), GpioError> {
        write_attr(&self.root.join("export"), &line.to_string())
    }

    async fn set_direction(&self, line: u8, direction: Direction) -> Result<(), GpioError> {
        write_attr(&self.line_attr(line, "direction"), direction.as_str())
    }

    async fn set_edge(&self, line: u8, edge: Edge) -> Result<(), GpioError> {
        write_attr(&self.line_attr(line, "edge"), edge.as_str())
    }

    async fn open_value(&self, line: u8) -> Result<SysfsValue, GpioError> {
        let file = File::open(self.line_attr(line, "value")).map_err(|e| map_io(&e))?;
        let notifier = if self.notify {
            Some(Notifier::spawn(line)?)
        } else {
            None
        };
        Ok(SysfsValue {
            line,
            file,
            notifier,
        })
    }
}

/// Open `value` file of an exported line
pub struct SysfsValue {
    line: u8,
    file: File,
    notifier: Option<Notifier>,
}

impl SysfsValue {
    pub fn line(&self) -> u8 {
        self.line
    }
}

impl GpioValue for SysfsValue {
    async fn read(&mut self) -> Result<u8, GpioError> {
        let mut byte = [0u8; 1];
        let n = self.file.read_at(&mut byte, 0).map_err(|e| map_io(&e))?;
        if n == 0 || !byte[0].is_ascii_digit() {
            return Err(GpioError::InvalidValue);
        }
        Ok(byte[0])
    }

    async fn wait_for_change(&mut self) -> Result<(), GpioError> {
        match &self.notifier {
            Some(notifier) => notifier.events.receive().await,
            None => Err(GpioError::Io),
        }
    }

    async fn close(self) -> Result<(), GpioError> {
        // Notifier::drop stops the thread; the file closes with self
        log::debug!("gpio{}: value closed", self.line);
        Ok(())
    }
}

struct Notifier {
    stop: Arc<AtomicBool>,
    events: Arc<Notifications>,
}

impl Notifier {
    fn spawn(line: u8) -> Result<Self, GpioError> {
        let mut poller = sysfs_gpio::Pin::new(u64::from(line))
            .get_poller()
            .map_err(|e| map_sysfs(&e))?;
        let stop = Arc::new(AtomicBool::new(false));
        let events: Arc<Notifications> = Arc::new(Channel::new());

        let thread_stop = Arc::clone(&stop);
        let thread_events = Arc::clone(&events);
        thread::Builder::new()
            .name(format!("gpio{line}-poll"))
            .spawn(move || {
                while !thread_stop.load(Ordering::Acquire) {
                    match poller.poll(POLL_TIMEOUT_MS) {
                        // A full channel already holds a wake-up; the reader
                        // re-reads the level anyway.
                        Ok(Some(_)) => {
                            let _ = thread_events.try_send(Ok(()));
                        }
                        Ok(None) => {}
                        Err(e) => {
                            log::warn!("gpio{line}: poll failed: {e}");
                            let _ = thread_events.try_send(Err(map_sysfs(&e)));
                            break;
                        }
                    }
                }
                log::trace!("gpio{line}: poller stopped");
            })
            .map_err(|e| map_io(&e))?;

        Ok(Self { stop, events })
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}
