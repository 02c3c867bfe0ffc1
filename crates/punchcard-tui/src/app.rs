use std::sync::Arc;

use tracing::debug;

use punchcard_core::hollerith::{self, RowLayout};
use punchcard_core::scheduler::{MAX_FPS, MIN_FPS};
use punchcard_core::{AnimationEvent, AnimationKind, AppConfig, Grid};

use crate::input::FPS_STEP;
use crate::theme::Theme;
use crate::widgets::CardWidget;

/// Renderer-side view of the display
pub struct App {
    pub config: Arc<AppConfig>,
    pub theme: Theme,
    /// Text printed along the top edge and punched between animations
    pub message: String,
    pub message_card: Grid,
    /// Latest snapshot published by the scheduler
    pub grid: Grid,
    pub row_labels: Vec<&'static str>,
    pub playing: Option<AnimationKind>,
    /// Last applied step and the session length
    pub progress: Option<(usize, usize)>,
    pub fps: u32,
    pub hardware_name: String,
    /// Name played by the custom animation key
    pub custom_name: String,
    pub status_message: Option<String>,
    /// The terminal is smaller than the card
    pub card_clipped: bool,
    pub show_help: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Arc<AppConfig>, message: &str, custom_name: &str) -> Self {
        let rows = config.display.rows;
        let columns = config.display.columns;
        let message_card =
            hollerith::encode_card(message, rows, columns, config.display.center_message);
        let mut row_labels = RowLayout::standard().labels();
        row_labels.truncate(rows);

        Self {
            theme: Theme::default(),
            message: message.to_string(),
            message_card,
            grid: Grid::new(rows, columns),
            row_labels,
            playing: None,
            progress: None,
            fps: config.animation.fps.clamp(MIN_FPS, MAX_FPS),
            hardware_name: "virtual".to_string(),
            custom_name: custom_name.to_string(),
            status_message: None,
            card_clipped: false,
            show_help: false,
            should_quit: false,
            config,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Text to print above the card: the message, centered like its punches
    pub fn printed_line(&self) -> String {
        let text: String = self.message.chars().take(self.grid.cols()).collect();
        let width = text.chars().count();
        let offset = if self.config.display.center_message {
            (self.grid.cols() - width) / 2
        } else {
            0
        };
        format!("{}{}", " ".repeat(offset), text.to_uppercase())
    }

    pub fn set_grid(&mut self, grid: Grid) {
        self.grid = grid;
    }

    pub fn is_playing(&self) -> bool {
        self.playing.is_some()
    }

    /// Track a scheduler event. Returns `true` when the message card should
    /// be shown again (a wave finished on its own).
    pub fn on_event(&mut self, event: AnimationEvent) -> bool {
        match event {
            AnimationEvent::Started { kind } => {
                if !self.card_clipped {
                    self.status_message = None;
                }
                self.progress = None;
                self.playing = Some(kind);
                false
            }
            AnimationEvent::Step { index, total } => {
                self.progress = Some((index, total));
                false
            }
            AnimationEvent::Finished { kind } => {
                debug!("{} finished", kind);
                self.playing = None;
                self.progress = None;
                // Sleep ends dark on purpose
                !matches!(kind, AnimationKind::Sleep)
            }
            AnimationEvent::Interrupted { kind } => {
                self.playing = None;
                self.progress = None;
                self.set_status(format!("{} interrupted", kind));
                false
            }
        }
    }

    /// Track the terminal size; the bottom line belongs to the status bar
    pub fn on_resize(&mut self, width: u16, height: u16) {
        let (card_width, card_height) = CardWidget::size(self.grid.rows(), self.grid.cols());
        let clipped = width < card_width || height.saturating_sub(1) < card_height;
        if clipped {
            self.set_status(format!(
                "Card clipped: needs {}x{}, window is {}x{}",
                card_width,
                card_height + 1,
                width,
                height
            ));
        } else if self.card_clipped {
            self.clear_status();
        }
        self.card_clipped = clipped;
    }

    /// Frame rate one step up or down, within the scheduler's limits
    pub fn stepped_fps(&self, faster: bool) -> u32 {
        let fps = if faster {
            self.fps.saturating_add(FPS_STEP)
        } else {
            self.fps.saturating_sub(FPS_STEP)
        };
        fps.clamp(MIN_FPS, MAX_FPS)
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}
