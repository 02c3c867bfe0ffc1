use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

/// What woke the display loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyEvent),
    /// New terminal size in cells
    Resize { width: u16, height: u16 },
    /// Nothing happened; time to pull the latest frame
    Redraw,
}

/// Waits on terminal input between card redraws
pub struct EventHandler {
    idle_wait: Duration,
}

impl EventHandler {
    pub fn new(idle_wait_ms: u64) -> Self {
        Self {
            idle_wait: Duration::from_millis(idle_wait_ms.max(1)),
        }
    }

    /// Input wait for the next loop turn. While an animation plays the
    /// card is redrawn at least once per frame.
    pub fn wait_for(&self, playing_fps: Option<u32>) -> Duration {
        match playing_fps {
            Some(fps) => {
                let frame = Duration::from_millis(1000 / u64::from(fps.max(1)));
                self.idle_wait.min(frame)
            }
            None => self.idle_wait,
        }
    }

    pub fn next(&self, wait: Duration) -> Result<AppEvent> {
        if !event::poll(wait)? {
            return Ok(AppEvent::Redraw);
        }
        Ok(match event::read()? {
            // Releases and repeats arrive on some platforms
            Event::Key(key) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
            Event::Resize(width, height) => AppEvent::Resize { width, height },
            _ => AppEvent::Redraw,
        })
    }
}
