//! Key events produced by the push-button lines

use core::fmt;

/// Press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum KeyKind {
    /// Line pulled low (button pressed)
    KeyDown,
    /// Line released
    KeyUp,
}

impl KeyKind {
    pub const ALL: [KeyKind; 2] = [KeyKind::KeyDown, KeyKind::KeyUp];

    /// Map a raw line value byte: ASCII `'0'` is a press, anything else a release
    pub const fn from_value(byte: u8) -> Self {
        if byte == b'0' {
            KeyKind::KeyDown
        } else {
            KeyKind::KeyUp
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            KeyKind::KeyDown => "keydown",
            KeyKind::KeyUp => "keyup",
        }
    }
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Function key, displayed as `F<n>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Key(u8);

impl Key {
    pub const F1: Key = Key(1);
    pub const F2: Key = Key(2);
    pub const F3: Key = Key(3);

    /// Key wired to a GPIO line
    ///
    /// Line 0 is F1; every other line N is F<N> (lines 2 and 3 are F2, F3).
    pub const fn from_line(line: u8) -> Self {
        if line == 0 {
            Key(1)
        } else {
            Key(line)
        }
    }

    /// Function key number
    pub const fn number(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

/// A single press or release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    pub kind: KeyKind,
    pub key: Key,
}

impl KeyEvent {
    pub const fn new(kind: KeyKind, key: Key) -> Self {
        Self { kind, key }
    }

    pub const fn keydown(key: Key) -> Self {
        Self::new(KeyKind::KeyDown, key)
    }

    pub const fn keyup(key: Key) -> Self {
        Self::new(KeyKind::KeyUp, key)
    }

    /// Event for a value byte read from a line
    pub const fn from_line_value(line: u8, byte: u8) -> Self {
        Self::new(KeyKind::from_value(byte), Key::from_line(line))
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.key)
    }
}
