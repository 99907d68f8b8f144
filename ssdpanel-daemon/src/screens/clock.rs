//! Clock screen: time large, date small

use chrono::{DateTime, TimeZone};

use ssdpanel_core::Framebuffer;

use super::{draw_centered, line, LARGE, SMALL};

pub fn draw<Tz: TimeZone>(fb: &mut Framebuffer, now: &DateTime<Tz>)
where
    Tz::Offset: core::fmt::Display,
{
    fb.clear();
    let time = line(format_args!("{}", now.format("%H:%M:%S")));
    let date = line(format_args!("{}", now.format("%Y-%m-%d %a")));
    draw_centered(fb, &time, LARGE, 30);
    draw_centered(fb, &date, SMALL, 52);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn lit_rows(fb: &Framebuffer) -> Vec<usize> {
        (0..64)
            .filter(|&y| (0..128).any(|x| fb.pixel(x, y).is_some_and(|p| p.r != 0)))
            .collect()
    }

    #[test]
    fn test_draws_time_and_date() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let mut fb = Framebuffer::new();
        draw(&mut fb, &now);

        let rows = lit_rows(&fb);
        // time glyphs sit above the date line
        assert!(rows.iter().any(|&y| y < 32));
        assert!(rows.iter().any(|&y| y > 43));
    }

    #[test]
    fn test_same_time_same_frame() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let mut a = Framebuffer::new();
        let mut b = Framebuffer::new();
        draw(&mut a, &now);
        draw(&mut b, &now);
        assert_eq!(a.pack(), b.pack());

        let later = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 8).unwrap();
        draw(&mut b, &later);
        assert_ne!(a.pack(), b.pack());
    }

    #[test]
    fn test_previous_contents_are_cleared() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let mut fb = Framebuffer::new();
        fb.fill(ssdpanel_core::Rgba::WHITE);
        draw(&mut fb, &now);
        assert_eq!(fb.pixel(0, 0), Some(ssdpanel_core::Rgba::BLACK));
    }
}
