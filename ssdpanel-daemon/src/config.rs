//! Daemon configuration
//!
//! Loaded from TOML. The default file is compiled in; a path on the command
//! line replaces it. Keys left out of a file keep their defaults.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use ssdpanel_drivers::display::DEFAULT_CONTRAST;
use ssdpanel_drivers::input::MAX_WATCHERS;
use ssdpanel_hal::i2c::DEFAULT_ADDRESS;
use ssdpanel_hal::I2cConfig;
use ssdpanel_hal_linux::DEFAULT_ROOT;

use crate::screens::Screen;

/// Embedded default configuration
pub const EMBEDDED_CONFIG: &str = include_str!("../ssdpanel.toml");

/// Accepted render rates, in ticks per second
pub const FRAME_RATE_RANGE: core::ops::RangeInclusive<u32> = 1..=120;

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    /// File could not be read
    Read { path: PathBuf, source: io::Error },
    /// Not valid TOML, or a value of the wrong type
    Parse(toml::de::Error),
    /// Parsed, but a value is out of range
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "cannot read {}: {source}", path.display())
            }
            ConfigError::Parse(e) => write!(f, "invalid config: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DisplayConfig {
    /// I2C bus number (`/dev/i2c-N`)
    pub bus: u8,
    pub address: u8,
    /// Applied after the fixed bring-up sequence
    pub contrast: u8,
    pub inverted: bool,
    pub frame_rate: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            bus: 0,
            address: DEFAULT_ADDRESS,
            contrast: DEFAULT_CONTRAST,
            inverted: false,
            frame_rate: 30,
        }
    }
}

impl DisplayConfig {
    pub fn i2c(&self) -> I2cConfig {
        I2cConfig::on_bus(self.bus).with_address(self.address)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeysConfig {
    /// GPIO lines to watch; line 0 is F1, line N is F<N>
    pub lines: Vec<u8>,
    pub sysfs_root: PathBuf,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            lines: vec![0, 2, 3],
            sysfs_root: PathBuf::from(DEFAULT_ROOT),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScreensConfig {
    /// Screen shown until the first key press
    pub initial: Screen,
    pub logo_path: PathBuf,
}

impl Default for ScreensConfig {
    fn default() -> Self {
        Self {
            initial: Screen::Logo,
            logo_path: PathBuf::from("/tmp/logo_img"),
        }
    }
}

/// Complete daemon configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DaemonConfig {
    pub display: DisplayConfig,
    pub keys: KeysConfig,
    pub screens: ScreensConfig,
}

impl DaemonConfig {
    /// Load from a file, or the embedded default if no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                log::info!("Loading configuration from {}", path.display());
                Self::parse(&text)
            }
            None => {
                log::info!("Using embedded configuration");
                Self::parse(EMBEDDED_CONFIG)
            }
        }
    }

    /// Parse and validate TOML text
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !FRAME_RATE_RANGE.contains(&self.display.frame_rate) {
            return Err(ConfigError::Invalid(format!(
                "frame_rate {} outside {}..={}",
                self.display.frame_rate,
                FRAME_RATE_RANGE.start(),
                FRAME_RATE_RANGE.end()
            )));
        }
        if self.display.address > 0x7F {
            return Err(ConfigError::Invalid(format!(
                "address {:#04x} is not a 7-bit address",
                self.display.address
            )));
        }

        let lines = &self.keys.lines;
        if lines.len() > MAX_WATCHERS {
            return Err(ConfigError::Invalid(format!(
                "{} key lines configured, at most {MAX_WATCHERS} supported",
                lines.len()
            )));
        }
        for (i, line) in lines.iter().enumerate() {
            if lines[..i].contains(line) {
                return Err(ConfigError::Invalid(format!("key line {line} listed twice")));
            }
        }
        Ok(())
    }
}
