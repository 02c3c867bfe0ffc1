use ratatui::style::Color;

/// Colors used by the card and status bar
#[derive(Debug, Clone)]
pub struct Theme {
    // Card stock
    pub card_bg: Color,
    pub card_border: Color,
    pub printed: Color,
    pub label: Color,

    // Cells
    pub punched: Color,
    pub unpunched: Color,

    // Status bar
    pub status_bg: Color,
    pub status_fg: Color,
    pub hint: Color,

    // Semantic colors
    pub playing: Color,
    pub idle: Color,
    pub warning: Color,
}

impl Theme {
    /// Plain palette for terminals without truecolor
    pub fn basic() -> Self {
        Self {
            card_bg: Color::Reset,
            card_border: Color::Yellow,
            printed: Color::White,
            label: Color::DarkGray,
            punched: Color::White,
            unpunched: Color::DarkGray,
            status_bg: Color::DarkGray,
            status_fg: Color::White,
            hint: Color::Gray,
            playing: Color::Green,
            idle: Color::Blue,
            warning: Color::Yellow,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        // Manila card on a gruvbox-dark status bar
        Self {
            card_bg: Color::Rgb(0xe8, 0xd9, 0xb0),
            card_border: Color::Rgb(0xb5, 0x9b, 0x6a),
            printed: Color::Rgb(0x3c, 0x38, 0x36),
            label: Color::Rgb(0x92, 0x83, 0x74),
            punched: Color::Rgb(0x28, 0x28, 0x28),
            unpunched: Color::Rgb(0xc9, 0xb8, 0x8c),
            status_bg: Color::Rgb(0x45, 0x40, 0x3d),
            status_fg: Color::Rgb(0xd4, 0xbe, 0x98),
            hint: Color::Rgb(0xa8, 0x99, 0x84),
            playing: Color::Rgb(0xa9, 0xb6, 0x65),
            idle: Color::Rgb(0x7d, 0xae, 0xa3),
            warning: Color::Rgb(0xe7, 0x8a, 0x4e),
        }
    }
}
