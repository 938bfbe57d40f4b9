use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use tokio::sync::mpsc;
use tracing::warn;

use crate::app::App;

/// How long the reader thread blocks before checking for shutdown.
const READ_POLL: Duration = Duration::from_millis(250);

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Forward terminal events to the event loop from a dedicated thread.
///
/// crossterm's reader blocks, so it cannot share the runtime thread. The
/// thread stops once the receiving side is dropped.
pub fn spawn_reader(events: mpsc::UnboundedSender<Event>) -> thread::JoinHandle<()> {
    thread::spawn(move || loop {
        match poll_event(READ_POLL) {
            Ok(Some(event)) => {
                if events.send(event).is_err() {
                    break;
                }
            }
            Ok(None) => {
                if events.is_closed() {
                    break;
                }
            }
            Err(e) => {
                warn!("Terminal event reader failed: {}", e);
                break;
            }
        }
    })
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    match key.code {
        // Ctrl-q included
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('?') => app.toggle_help(),
        _ => {}
    }
}

/// Handle mouse events: pointer movement drives the hover text.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => {
            let point = app
                .viewport
                .and_then(|vp| vp.cell_to_pixel(mouse.column, mouse.row));
            app.hover_at(point);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Geometry, ItemLoader};
    use crate::sensor::{Probe, ProbeOutcome, Prober};
    use crate::ui::Viewport;
    use async_trait::async_trait;
    use crossterm::event::{KeyEventKind, KeyModifiers};
    use ratatui::layout::Rect;
    use std::sync::Arc;

    #[derive(Debug)]
    struct IdleProber;

    #[async_trait]
    impl Prober for IdleProber {
        async fn run(&self, _probe: Probe) -> ProbeOutcome {
            ProbeOutcome::ExitCode(0)
        }
    }

    fn app() -> App {
        let items = ItemLoader::new()
            .load_str(
                "[[item]]\nsensor = \"Status\"\ntype = \"Lamp\"\nname = \"gateway\"\n",
                "test.toml",
            )
            .unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(items, Arc::new(IdleProber), tx, Geometry::new(640, 384), 600)
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new_with_kind(code, modifiers, KeyEventKind::Press)
    }

    fn mouse(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Moved,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_quit_keys() {
        for (code, modifiers) in [
            (KeyCode::Char('q'), KeyModifiers::NONE),
            (KeyCode::Char('q'), KeyModifiers::CONTROL),
            (KeyCode::Esc, KeyModifiers::NONE),
        ] {
            let mut app = app();
            handle_key_event(&mut app, key(code, modifiers));
            assert!(!app.running);
        }
    }

    #[test]
    fn test_help_closes_on_any_key() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('?'), KeyModifiers::NONE));
        assert!(app.show_help);

        handle_key_event(&mut app, key(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(!app.show_help);
        assert!(app.running, "closing help does not quit");
    }

    #[test]
    fn test_pointer_hover() {
        let mut app = app();
        app.viewport = Some(Viewport::new(
            Rect::new(0, 1, 80, 22),
            Rect::new(0, 0, 80, 24),
            Geometry::new(640, 384),
        ));

        // Cell (2, 2) is around pixel (20, 24), inside the 40x40 lamp
        handle_mouse_event(&mut app, mouse(2, 2));
        assert_eq!(app.status_text.as_deref(), Some("gateway"));

        handle_mouse_event(&mut app, mouse(60, 10));
        assert_eq!(app.status_text, None);

        handle_mouse_event(&mut app, mouse(2, 2));
        handle_mouse_event(&mut app, mouse(2, 0));
        assert_eq!(app.status_text, None, "leaving over the header clears");
    }
}
