use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, MouseEvent};
use tokio::sync::mpsc;

use tui_console::{ConsoleError, Result};

/// Application events.
#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Text from a bracketed paste.
    Paste(String),
    /// Periodic tick; console requests are drained and the screen redrawn.
    Tick,
    #[allow(dead_code)]
    Resize(u16, u16),
    /// Terminal window gained (`true`) or lost focus.
    Focus(bool),
}

/// Async event handler that polls crossterm events and forwards them via a channel.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
    /// Create a new EventHandler with the given tick rate.
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            loop {
                let event = if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(CrosstermEvent::Key(key)) => Event::Key(key),
                        Ok(CrosstermEvent::Mouse(mouse)) => Event::Mouse(mouse),
                        Ok(CrosstermEvent::Paste(text)) => Event::Paste(text),
                        Ok(CrosstermEvent::Resize(w, h)) => Event::Resize(w, h),
                        Ok(CrosstermEvent::FocusGained) => Event::Focus(true),
                        Ok(CrosstermEvent::FocusLost) => Event::Focus(false),
                        Err(e) => {
                            tracing::warn!(error = %e, "failed to read terminal event");
                            continue;
                        }
                    }
                } else {
                    Event::Tick
                };
                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx }
    }

    /// Receive the next event (blocks until available).
    pub async fn next(&mut self) -> Result<Event> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| ConsoleError::Terminal("Event channel closed".into()))
    }
}
