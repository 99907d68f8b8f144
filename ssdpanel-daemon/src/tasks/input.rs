//! Key handling: turns key presses into screen selections

use core::convert::Infallible;

use embassy_sync::blocking_mutex::raw::RawMutex;

use ssdpanel_core::{KeyEvent, KeyKind};
use ssdpanel_drivers::input::EventQueue;

use super::ScreenSignal;
use crate::screens::Screen;

/// Screen a key event selects; releases select nothing
pub fn screen_for(event: KeyEvent) -> Option<Screen> {
    match event.kind {
        KeyKind::KeyDown => Some(Screen::for_key(event.key)),
        KeyKind::KeyUp => None,
    }
}

/// Forward key presses to the render loop
pub async fn input_loop<M: RawMutex>(
    mut queue: EventQueue<'_, M>,
    selected: &ScreenSignal,
) -> Infallible {
    log::info!("Input loop started");
    loop {
        match queue.next_event().await {
            Ok(event) => match screen_for(event) {
                Some(screen) => {
                    log::debug!("{event}: {screen}");
                    selected.signal(screen);
                }
                None => log::debug!("{event}"),
            },
            Err(e) => log::warn!("{e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssdpanel_core::Key;

    #[test]
    fn test_keydown_selects() {
        assert_eq!(screen_for(KeyEvent::keydown(Key::F1)), Some(Screen::Clock));
        assert_eq!(screen_for(KeyEvent::keydown(Key::F2)), Some(Screen::Stats));
        assert_eq!(screen_for(KeyEvent::keydown(Key::F3)), Some(Screen::Logo));
    }

    #[test]
    fn test_keyup_selects_nothing() {
        assert_eq!(screen_for(KeyEvent::keyup(Key::F1)), None);
        assert_eq!(screen_for(KeyEvent::keyup(Key::F2)), None);
    }
}
