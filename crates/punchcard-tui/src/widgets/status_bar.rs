use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;

const HELP_HINT: &str = " q:quit s/z/w/c:play x:stop +/-:fps ?:help ";

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        let status_text = status_text(app);
        let state_color = if app.is_playing() {
            theme.playing
        } else if app.status_message.is_some() {
            theme.warning
        } else {
            theme.idle
        };

        let used = status_text.width() + HELP_HINT.width();
        let padding_len = (area.width as usize).saturating_sub(used);

        let line = Line::from(vec![
            Span::styled(
                status_text,
                Style::default().fg(state_color).bg(theme.status_bg),
            ),
            Span::styled(" ".repeat(padding_len), Style::default().bg(theme.status_bg)),
            Span::styled(HELP_HINT, Style::default().fg(theme.hint).bg(theme.status_bg)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Left side of the status bar
pub fn status_text(app: &App) -> String {
    if let Some(msg) = &app.status_message {
        return format!(" {}", msg);
    }

    let state = match (&app.playing, app.progress) {
        (Some(kind), Some((index, total))) => format!("PLAYING {} {}/{}", kind, index + 1, total),
        (Some(kind), None) => format!("PLAYING {}", kind),
        (None, _) => "IDLE".to_string(),
    };
    format!(" {} | {} fps | link: {}", state, app.fps, app.hardware_name)
}
