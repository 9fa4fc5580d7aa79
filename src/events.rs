use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::App;

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // Windows reports both press and release
    if key.kind == KeyEventKind::Release {
        return;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Char('r') => app.request_refresh(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::TelemetryFeed;
    use crate::ui::Theme;

    fn app() -> App {
        let (_tx, feed) = TelemetryFeed::create("test");
        App::new(feed, Theme::dark())
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn q_and_esc_quit() {
        let mut a = app();
        handle_key_event(&mut a, key(KeyCode::Char('q')));
        assert!(!a.running);

        let mut a = app();
        handle_key_event(&mut a, key(KeyCode::Esc));
        assert!(!a.running);
    }

    #[test]
    fn ctrl_c_quits() {
        let mut a = app();
        handle_key_event(
            &mut a,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(!a.running);
    }

    #[test]
    fn any_key_closes_help() {
        let mut a = app();
        handle_key_event(&mut a, key(KeyCode::Char('?')));
        assert!(a.show_help);

        // 'q' closes help rather than quitting
        handle_key_event(&mut a, key(KeyCode::Char('q')));
        assert!(!a.show_help);
        assert!(a.running);
    }

    #[test]
    fn r_requests_refresh() {
        let mut a = app();
        handle_key_event(&mut a, key(KeyCode::Char('r')));
        assert!(a.take_refresh_request());
    }
}
