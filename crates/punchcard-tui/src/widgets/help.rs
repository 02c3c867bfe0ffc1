use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::theme::Theme;

const BINDINGS: &[(&str, &str)] = &[
    ("s", "startup wave"),
    ("!", "restart startup now"),
    ("z", "sleep"),
    ("w", "wake"),
    ("c", "custom animation"),
    ("x", "interrupt"),
    ("+ / -", "faster / slower"),
    ("m", "show message"),
    ("q", "quit"),
];

pub struct HelpWidget;

impl HelpWidget {
    /// Render the key binding popup centered over the frame
    pub fn render(frame: &mut Frame, theme: &Theme) {
        let area = frame.area();
        let width = 36u16.min(area.width.saturating_sub(4));
        let height = (BINDINGS.len() as u16 + 2).min(area.height.saturating_sub(2));
        let popup_area = centered_rect(width, height, area);

        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Keys ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.card_border))
            .style(Style::default().bg(theme.status_bg));

        let lines: Vec<Line> = BINDINGS
            .iter()
            .map(|(key, what)| {
                Line::from(vec![
                    Span::styled(
                        format!("{:>7}  ", key),
                        Style::default()
                            .fg(theme.playing)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(*what, Style::default().fg(theme.status_fg)),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), popup_area);
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}
