//! ssdpanel - status panel daemon
//!
//! Brings up an SSD1306 OLED on an I2C bus, watches the push-button GPIO
//! lines and shows a clock, system stats or a logo, selected with F1/F2/F3.
//!
//! Usage: `ssdpanel [CONFIG]`. Without a config path the compiled-in
//! ssdpanel.toml is used. Logging follows `RUST_LOG` (default `info`).

use std::path::PathBuf;

use anyhow::Context;
use embassy_executor::Spawner;
use embassy_futures::join::{join, join_array};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use ssdpanel_core::KeyKind;
use ssdpanel_drivers::display::Ssd1306;
use ssdpanel_drivers::input::{InputEventSource, MAX_WATCHERS};
use ssdpanel_hal_linux::{open_i2c, SysfsGpio};

use crate::config::DaemonConfig;
use crate::screens::{Logo, Screens};
use crate::tasks::{ExitReason, Renderer, ScreenSignal, StopSignal};

mod config;
mod screens;
mod tasks;

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("ssdpanel starting...");

    match run().await {
        Ok(reason) => {
            log::error!("{reason}");
            std::process::exit(reason.exit_code());
        }
        Err(e) => {
            log::error!("{e:#}");
            std::process::exit(1);
        }
    }
}

/// Bring everything up and run until the display is lost
async fn run() -> anyhow::Result<ExitReason> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = DaemonConfig::load(config_path.as_deref()).context("loading configuration")?;

    // Display: a transport failure here is fatal
    let i2c_config = config.display.i2c();
    let i2c = open_i2c(&i2c_config)
        .with_context(|| format!("opening I2C bus {}", i2c_config.bus))?;
    let mut display = Ssd1306::with_address(i2c, i2c_config.address);
    display.initialize().await.context("initializing display")?;
    display.clear().await.context("clearing display")?;
    display
        .set_contrast(config.display.contrast)
        .await
        .context("setting contrast")?;
    if config.display.inverted {
        display.set_inverted(true).await.context("inverting display")?;
    }
    log::info!(
        "Display ready on bus {} at {:#04x}",
        i2c_config.bus,
        i2c_config.address
    );

    let screens = Screens::with_logo(Logo::load_or_placeholder(&config.screens.logo_path));
    let mut renderer = Renderer::new(display, screens, config.screens.initial);
    log::info!("Showing {} first", renderer.current());

    // Keys: a line that cannot be set up is left out, the others still work
    let source = InputEventSource::<CriticalSectionRawMutex>::new();
    let gpio = SysfsGpio::with_root(&config.keys.sysfs_root);
    let queue = source
        .create_event_queue(&KeyKind::ALL)
        .context("creating key event queue")?;

    let mut slots: [Option<_>; MAX_WATCHERS] = Default::default();
    for (slot, &line) in slots.iter_mut().zip(&config.keys.lines) {
        match source.watch(&gpio, line).await {
            Ok(watcher) => *slot = Some(watcher),
            Err(e) => log::error!("Not watching gpio{line}: {e}"),
        }
    }

    let selected = ScreenSignal::new();
    let stops: [StopSignal; MAX_WATCHERS] = core::array::from_fn(|_| StopSignal::new());
    let mut slots = slots.into_iter();
    let watchers = join_array(core::array::from_fn::<_, MAX_WATCHERS, _>(|i| {
        tasks::watch_line(slots.next().flatten(), &stops[i])
    }));

    let app = async {
        let reason = match select(
            tasks::render_loop(&mut renderer, &selected, config.display.frame_rate),
            tasks::input_loop(queue, &selected),
        )
        .await
        {
            Either::First(reason) => reason,
            Either::Second(never) => match never {},
        };
        log::info!("Shutting down: {reason}");
        for stop in &stops {
            stop.signal(());
        }
        reason
    };

    let (reason, _) = join(app, watchers).await;
    Ok(reason)
}
