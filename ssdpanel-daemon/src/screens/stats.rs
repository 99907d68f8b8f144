//! System stats screen

use std::fs;
use std::io;

use ssdpanel_core::Framebuffer;

use super::{draw_centered, draw_line, line, SMALL};

/// Snapshot of load, uptime and memory
#[derive(Debug, Clone, PartialEq)]
pub struct SystemStats {
    /// 1, 5 and 15 minute load averages
    pub load: [f32; 3],
    pub uptime_secs: u64,
    pub mem_total_kb: u64,
    pub mem_available_kb: u64,
}

impl SystemStats {
    /// Read from /proc
    pub fn read() -> io::Result<Self> {
        let loadavg = fs::read_to_string("/proc/loadavg")?;
        let uptime = fs::read_to_string("/proc/uptime")?;
        let meminfo = fs::read_to_string("/proc/meminfo")?;
        Self::parse(&loadavg, &uptime, &meminfo)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "unexpected /proc format"))
    }

    pub fn parse(loadavg: &str, uptime: &str, meminfo: &str) -> Option<Self> {
        let (mem_total_kb, mem_available_kb) = parse_meminfo(meminfo)?;
        Some(Self {
            load: parse_loadavg(loadavg)?,
            uptime_secs: parse_uptime(uptime)?,
            mem_total_kb,
            mem_available_kb,
        })
    }
}

fn parse_loadavg(text: &str) -> Option<[f32; 3]> {
    let mut fields = text.split_whitespace().map(|f| f.parse::<f32>().ok());
    Some([fields.next()??, fields.next()??, fields.next()??])
}

fn parse_uptime(text: &str) -> Option<u64> {
    let secs: f64 = text.split_whitespace().next()?.parse().ok()?;
    Some(secs as u64)
}

/// `(MemTotal, MemAvailable)` in kB
fn parse_meminfo(text: &str) -> Option<(u64, u64)> {
    let mut total = None;
    let mut available = None;
    for row in text.lines() {
        let mut fields = row.split_whitespace();
        let slot = match fields.next() {
            Some("MemTotal:") => &mut total,
            Some("MemAvailable:") => &mut available,
            _ => continue,
        };
        *slot = fields.next().and_then(|v| v.parse().ok());
    }
    Some((total?, available?))
}

pub fn draw(fb: &mut Framebuffer, stats: Option<&SystemStats>) {
    fb.clear();
    let Some(stats) = stats else {
        draw_centered(fb, "no stats", SMALL, 36);
        return;
    };

    let [l1, l5, l15] = stats.load;
    let days = stats.uptime_secs / 86_400;
    let hours = stats.uptime_secs / 3600 % 24;
    let minutes = stats.uptime_secs / 60 % 60;
    let used_mib = stats.mem_total_kb.saturating_sub(stats.mem_available_kb) / 1024;
    let total_mib = stats.mem_total_kb / 1024;

    draw_line(fb, &line(format_args!("load {l1:.2} {l5:.2} {l15:.2}")), 0);
    draw_line(fb, &line(format_args!("up   {days}d {hours:02}:{minutes:02}")), 1);
    draw_line(fb, &line(format_args!("mem  {used_mib}/{total_mib} MiB")), 2);
    draw_line(
        fb,
        &line(format_args!("free {} MiB", stats.mem_available_kb / 1024)),
        3,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOADAVG: &str = "0.52 0.48 0.40 1/123 4567\n";
    const UPTIME: &str = "273845.12 1034212.55\n";
    const MEMINFO: &str = "MemTotal:         505856 kB\n\
                           MemFree:           21400 kB\n\
                           MemAvailable:     312320 kB\n\
                           Buffers:           10240 kB\n";

    #[test]
    fn test_parse() {
        let stats = SystemStats::parse(LOADAVG, UPTIME, MEMINFO).unwrap();
        assert_eq!(stats.load, [0.52, 0.48, 0.40]);
        assert_eq!(stats.uptime_secs, 273_845);
        assert_eq!(stats.mem_total_kb, 505_856);
        assert_eq!(stats.mem_available_kb, 312_320);
    }

    #[test]
    fn test_parse_rejects_truncated_input() {
        assert_eq!(parse_loadavg("0.1 0.2"), None);
        assert_eq!(parse_uptime(""), None);
        assert_eq!(parse_meminfo("MemTotal: 1000 kB\n"), None);
        assert!(SystemStats::parse("x y z", UPTIME, MEMINFO).is_none());
    }

    #[test]
    fn test_draw_with_and_without_stats() {
        let stats = SystemStats::parse(LOADAVG, UPTIME, MEMINFO).unwrap();
        let mut with = Framebuffer::new();
        draw(&mut with, Some(&stats));
        let mut without = Framebuffer::new();
        draw(&mut without, None);

        assert_ne!(with.pack(), without.pack());
        assert_ne!(without.pack(), Framebuffer::new().pack());
    }
}
