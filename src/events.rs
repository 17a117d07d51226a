use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

use crate::app::App;
use crate::data::Clock;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event<C: Clock>(app: &mut App<C>, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        // Display options
        KeyCode::Char('u') => app.toggle_unit(),
        KeyCode::Char('t') => app.cycle_time_frame(),

        // Reload
        KeyCode::Char('r') => {
            if !app.reload_data() {
                app.set_status_message("No new data".to_string());
            }
        }

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Denomination, FreshnessMonitor, ManualClock, Thresholds, TimeFrame};
    use crate::source::{ChannelSource, FeedUpdate};
    use crate::ui::Theme;
    use chrono::Utc;
    use tokio::sync::watch;

    fn test_app() -> (watch::Sender<FeedUpdate>, App<ManualClock>) {
        let clock = ManualClock::new(Utc::now());
        let monitor = FreshnessMonitor::with_clock(clock, Thresholds::default());
        let (tx, source) = ChannelSource::create("test");
        let app = App::with_theme(
            Box::new(source),
            monitor,
            Denomination::Native,
            TimeFrame::M5,
            Theme::dark(),
        );
        (tx, app)
    }

    fn press(app: &mut App<ManualClock>, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_display_keys() {
        let (_tx, mut app) = test_app();

        press(&mut app, KeyCode::Char('u'));
        assert_eq!(app.unit, Denomination::Fiat);

        press(&mut app, KeyCode::Char('t'));
        assert_eq!(app.time_frame, TimeFrame::H1);
    }

    #[test]
    fn test_help_swallows_next_key() {
        let (_tx, mut app) = test_app();

        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);

        press(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(app.running);
    }

    #[test]
    fn test_quit_keys() {
        let (_tx, mut app) = test_app();
        press(&mut app, KeyCode::Esc);
        assert!(!app.running);

        let (_tx, mut app) = test_app();
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.running);
    }

    #[test]
    fn test_reload_key() {
        let (_tx, mut app) = test_app();

        // First poll yields the channel's initial value
        press(&mut app, KeyCode::Char('r'));
        assert!(app.last_updated.is_some());

        press(&mut app, KeyCode::Char('r'));
        assert_eq!(app.get_status_message(), Some("No new data"));
    }
}
