use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::theme::Theme;

const PUNCHED: &str = "█";
const ZONE_BLANK: &str = "·";
/// Label column plus one space
const GUTTER: usize = 3;

pub struct CardWidget;

impl CardWidget {
    /// Cells needed to draw a `rows` x `cols` card without clipping:
    /// border, printed line and label gutter included
    pub fn size(rows: usize, cols: usize) -> (u16, u16) {
        let width = cols + GUTTER + 2;
        let height = rows + 1 + 2;
        (
            u16::try_from(width).unwrap_or(u16::MAX),
            u16::try_from(height).unwrap_or(u16::MAX),
        )
    }

    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let title = match &app.playing {
            Some(kind) => format!(" IBM 029 · {} ", kind),
            None => " IBM 029 ".to_string(),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.card_border))
            .style(Style::default().bg(app.theme.card_bg));

        let paragraph = Paragraph::new(card_lines(app)).block(block);
        frame.render_widget(paragraph, area);
    }
}

/// Symbol for an unpunched cell: the digit printed on that row, if any
fn blank_symbol(label: Option<&str>) -> &str {
    match label {
        Some(l) if l.len() == 1 => l,
        _ => ZONE_BLANK,
    }
}

/// Printed text line followed by one line per grid row
pub fn card_lines(app: &App) -> Vec<Line<'static>> {
    let theme: &Theme = &app.theme;
    let mut lines = Vec::with_capacity(app.grid.rows() + 1);

    lines.push(Line::from(vec![
        Span::raw(" ".repeat(GUTTER)),
        Span::styled(
            app.printed_line(),
            Style::default()
                .fg(theme.printed)
                .add_modifier(Modifier::BOLD),
        ),
    ]));

    for row in 0..app.grid.rows() {
        let label = app.row_labels.get(row).copied();
        let mut spans = Vec::with_capacity(app.grid.cols() + 1);
        spans.push(Span::styled(
            format!("{:>2} ", label.unwrap_or("")),
            Style::default().fg(theme.label),
        ));
        for &lit in app.grid.row(row) {
            spans.push(if lit {
                Span::styled(PUNCHED, Style::default().fg(theme.punched))
            } else {
                Span::styled(
                    blank_symbol(label).to_string(),
                    Style::default().fg(theme.unpunched),
                )
            });
        }
        lines.push(Line::from(spans));
    }

    lines
}
