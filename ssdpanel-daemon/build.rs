//! Build script for ssdpanel-daemon
//!
//! Validates the embedded ssdpanel.toml at compile time so a broken default
//! config never ships.

use std::fs;
use std::path::Path;

/// Matches the number of lines one input source can watch
const MAX_KEY_LINES: usize = 4;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    validate_config();
}

/// Validate ssdpanel.toml at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=ssdpanel.toml");

    let config_path = Path::new("ssdpanel.toml");

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read ssdpanel.toml                             ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in ssdpanel.toml                     ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    let mut errors = Vec::new();
    validate_display(&config, &mut errors);
    validate_keys(&config, &mut errors);
    validate_screens(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid values in ssdpanel.toml                          ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(display) = config.get("display") else {
        return;
    };

    if let Some(toml::Value::Integer(bus)) = display.get("bus") {
        if !(0..=255).contains(bus) {
            errors.push("[display] bus must be 0-255".to_string());
        }
    }
    if let Some(toml::Value::Integer(address)) = display.get("address") {
        if !(0..=0x7F).contains(address) {
            errors.push("[display] address must be a 7-bit value".to_string());
        }
    }
    if let Some(toml::Value::Integer(contrast)) = display.get("contrast") {
        if !(0..=255).contains(contrast) {
            errors.push("[display] contrast must be 0-255".to_string());
        }
    }
    if let Some(toml::Value::Integer(rate)) = display.get("frame_rate") {
        if !(1..=120).contains(rate) {
            errors.push("[display] frame_rate must be 1-120".to_string());
        }
    }
}

fn validate_keys(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(toml::Value::Array(lines)) = config.get("keys").and_then(|k| k.get("lines")) else {
        return;
    };

    if lines.len() > MAX_KEY_LINES {
        errors.push(format!("[keys] at most {} lines", MAX_KEY_LINES));
    }
    let mut seen = Vec::new();
    for line in lines {
        match line {
            toml::Value::Integer(n) if (0..=255).contains(n) => {
                if seen.contains(n) {
                    errors.push(format!("[keys] line {} listed twice", n));
                }
                seen.push(*n);
            }
            _ => errors.push("[keys] lines must be GPIO numbers 0-255".to_string()),
        }
    }
}

fn validate_screens(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(toml::Value::String(initial)) =
        config.get("screens").and_then(|s| s.get("initial"))
    {
        if !["clock", "stats", "logo"].contains(&initial.as_str()) {
            errors.push("[screens] initial must be 'clock', 'stats', or 'logo'".to_string());
        }
    }
}
