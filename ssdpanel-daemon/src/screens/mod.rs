//! Screens shown on the panel
//!
//! Each screen draws into the shared [`Framebuffer`] with `embedded-graphics`.
//! Text and primitives are drawn in pure black/white; only the logo, an
//! imported bitmap, goes through dithering.

use core::fmt::{self, Write};
use std::time::{Duration, Instant};

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Text};
use heapless::String;
use serde::Deserialize;

use ssdpanel_core::{Framebuffer, Key, WIDTH};

pub mod clock;
pub mod logo;
pub mod stats;

pub use logo::Logo;
pub use stats::SystemStats;

/// How often the stats screen re-reads /proc
const STATS_REFRESH: Duration = Duration::from_secs(1);

pub(crate) const LARGE: &MonoFont<'static> = &FONT_10X20;
pub(crate) const SMALL: &MonoFont<'static> = &FONT_6X10;

/// Text line buffer; wider than the 21 columns of the small font
pub type Line = String<32>;

/// What the panel shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    Clock,
    Stats,
    Logo,
}

impl Screen {
    /// Screen selected by a key press
    ///
    /// F1 shows the clock, F2 the system stats; F3 and any other key the logo.
    pub fn for_key(key: Key) -> Self {
        match key {
            Key::F1 => Screen::Clock,
            Key::F2 => Screen::Stats,
            _ => Screen::Logo,
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Screen::Clock => "clock",
            Screen::Stats => "stats",
            Screen::Logo => "logo",
        })
    }
}

/// Everything the screens need between frames
pub struct Screens {
    logo: Logo,
    stats: Option<(Instant, Option<SystemStats>)>,
}

impl Screens {
    pub fn with_logo(logo: Logo) -> Self {
        Self { logo, stats: None }
    }

    /// Draw a screen into the framebuffer, replacing its contents
    pub fn render(&mut self, screen: Screen, fb: &mut Framebuffer) {
        match screen {
            Screen::Clock => clock::draw(fb, &chrono::Local::now()),
            Screen::Stats => {
                let stats = self.stats();
                stats::draw(fb, stats.as_ref());
            }
            Screen::Logo => self.logo.draw(fb),
        }
    }

    fn stats(&mut self) -> Option<SystemStats> {
        let stale = match &self.stats {
            Some((at, _)) => at.elapsed() >= STATS_REFRESH,
            None => true,
        };
        if stale {
            let stats = match SystemStats::read() {
                Ok(stats) => Some(stats),
                Err(e) => {
                    log::warn!("Reading system stats failed: {e}");
                    None
                }
            };
            self.stats = Some((Instant::now(), stats));
        }
        self.stats.as_ref().and_then(|(_, stats)| stats.clone())
    }
}

/// Draw a line of text centered horizontally, `baseline` pixels from the top
pub(crate) fn draw_centered(fb: &mut Framebuffer, text: &str, font: &MonoFont<'_>, baseline: i32) {
    let style = MonoTextStyle::new(font, Rgb888::WHITE);
    let position = Point::new(WIDTH as i32 / 2, baseline);
    let _ = Text::with_alignment(text, position, style, Alignment::Center).draw(fb);
}

/// Draw a line of small text from the left edge
pub(crate) fn draw_line(fb: &mut Framebuffer, text: &str, row: i32) {
    let style = MonoTextStyle::new(SMALL, Rgb888::WHITE);
    let _ = Text::new(text, Point::new(2, 10 + row * 12), style).draw(fb);
}

/// Format into a fixed line buffer; text past its capacity is dropped
pub(crate) fn line(args: fmt::Arguments<'_>) -> Line {
    let mut s = Line::new();
    let _ = s.write_fmt(args);
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(Screen::for_key(Key::F1), Screen::Clock);
        assert_eq!(Screen::for_key(Key::F2), Screen::Stats);
        assert_eq!(Screen::for_key(Key::F3), Screen::Logo);
        assert_eq!(Screen::for_key(Key::from_line(7)), Screen::Logo);
    }

    #[test]
    fn test_line_truncates() {
        let long = line(format_args!("{}", "x".repeat(40)));
        assert!(long.len() <= 32);
        assert_eq!(line(format_args!("up {}", 3)).as_str(), "up 3");
    }

    #[test]
    fn test_draw_centered_lights_middle() {
        let mut fb = Framebuffer::new();
        draw_centered(&mut fb, "88", LARGE, 30);

        let lit: Vec<usize> = (0..WIDTH)
            .filter(|&x| (0..64).any(|y| fb.pixel(x, y).is_some_and(|p| p.r != 0)))
            .collect();
        assert!(!lit.is_empty());
        assert!(lit[0] >= 50 && *lit.last().unwrap() < 78);
    }

    #[test]
    fn test_logo_screen_uses_logo() {
        let mut screens = Screens::with_logo(Logo::placeholder());
        let mut fb = Framebuffer::new();
        screens.render(Screen::Logo, &mut fb);
        assert_eq!(fb, Logo::placeholder().frame().clone());
    }
}
