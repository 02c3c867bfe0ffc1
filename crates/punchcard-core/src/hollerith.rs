//! IBM 029 Hollerith encoding.
//!
//! A card column has twelve punch positions, top to bottom: zone 12, zone 11,
//! then digit rows 0 through 9. Row 0 doubles as the third zone row, so the
//! digit '0' and the zone-0 punch of 'S'..'Z' share the same hole.
//!
//! Grid row indices follow the card: index 0 = row 12, index 1 = row 11,
//! index 2 = row 0, indices 3..=11 = rows 1..=9.

use std::fmt;

use tracing::debug;

use crate::grid::Grid;

/// Punch positions in one card column
pub const CARD_ROWS: usize = 12;

pub const ZONE_12: usize = 0;
pub const ZONE_11: usize = 1;
pub const ZONE_0: usize = 2;

/// Pattern used for characters with no code of their own (rows 11 and 0)
pub const FALLBACK_PATTERN: PunchPattern = PunchPattern((1 << ZONE_11) | (1 << ZONE_0));

const ROW_LABELS: [&str; CARD_ROWS] = ["12", "11", "0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

/// Grid row index of a digit punch (`0..=9`)
#[inline]
pub const fn digit_row(digit: u8) -> usize {
    if digit == 0 {
        ZONE_0
    } else {
        digit as usize + 2
    }
}

/// Printed label of a canonical row index ("12", "11", "0".."9")
pub fn row_label(index: usize) -> Option<&'static str> {
    ROW_LABELS.get(index).copied()
}

/// A physical punch position on the card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PunchRow {
    Twelve,
    Eleven,
    /// Digit rows 0..=9 (row 0 is also the zone-0 row)
    Digit(u8),
}

impl PunchRow {
    /// Canonical 12-row index, `None` for digits above 9
    pub fn index(self) -> Option<usize> {
        match self {
            PunchRow::Twelve => Some(ZONE_12),
            PunchRow::Eleven => Some(ZONE_11),
            PunchRow::Digit(d) if d <= 9 => Some(digit_row(d)),
            PunchRow::Digit(_) => None,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            ZONE_12 => Some(PunchRow::Twelve),
            ZONE_11 => Some(PunchRow::Eleven),
            ZONE_0 => Some(PunchRow::Digit(0)),
            3..=11 => Some(PunchRow::Digit((index - 2) as u8)),
            _ => None,
        }
    }

    /// Parse a printed row label such as "12" or "7"
    pub fn from_label(label: &str) -> Option<Self> {
        let index = ROW_LABELS.iter().position(|l| *l == label.trim())?;
        Self::from_index(index)
    }
}

/// Set of canonical row indices punched in one column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PunchPattern(u16);

impl PunchPattern {
    pub const EMPTY: PunchPattern = PunchPattern(0);

    /// Build from canonical row indices; indices off the card are ignored
    pub fn from_rows(rows: &[usize]) -> Self {
        rows.iter()
            .filter(|&&r| r < CARD_ROWS)
            .fold(Self::EMPTY, |acc, &r| PunchPattern(acc.0 | (1 << r)))
    }

    /// Read one column of a canonical 12-row grid
    pub fn from_column(grid: &Grid, col: usize) -> Self {
        let rows: Vec<usize> = (0..CARD_ROWS.min(grid.rows()))
            .filter(|&r| grid.get(r, col))
            .collect();
        Self::from_rows(&rows)
    }

    #[inline]
    pub fn contains(self, row: usize) -> bool {
        row < CARD_ROWS && self.0 & (1 << row) != 0
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Punched row indices, top to bottom
    pub fn rows(self) -> impl Iterator<Item = usize> {
        (0..CARD_ROWS).filter(move |&r| self.contains(r))
    }

    /// Human-readable row list, e.g. "12,1" for 'A'; empty for a blank column
    pub fn label(self) -> String {
        self.rows()
            .filter_map(row_label)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parse a row list such as "12,1" or "0-7-8"
    pub fn parse_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() {
            return Some(Self::EMPTY);
        }
        let mut rows = Vec::new();
        for part in label.split([',', '-']) {
            rows.push(PunchRow::from_label(part)?.index()?);
        }
        Some(Self::from_rows(&rows))
    }
}

impl fmt::Display for PunchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Multi-punch special characters of the IBM 029 keypunch
const PUNCTUATION: &[(char, &[usize])] = &[
    ('&', &[ZONE_12]),
    ('-', &[ZONE_11]),
    ('/', &[ZONE_0, digit_row(1)]),
    ('¢', &[ZONE_12, digit_row(2), digit_row(8)]),
    ('.', &[ZONE_12, digit_row(3), digit_row(8)]),
    ('<', &[ZONE_12, digit_row(4), digit_row(8)]),
    ('(', &[ZONE_12, digit_row(5), digit_row(8)]),
    ('+', &[ZONE_12, digit_row(6), digit_row(8)]),
    ('|', &[ZONE_12, digit_row(7), digit_row(8)]),
    ('!', &[ZONE_11, digit_row(2), digit_row(8)]),
    ('$', &[ZONE_11, digit_row(3), digit_row(8)]),
    ('*', &[ZONE_11, digit_row(4), digit_row(8)]),
    (')', &[ZONE_11, digit_row(5), digit_row(8)]),
    (';', &[ZONE_11, digit_row(6), digit_row(8)]),
    ('¬', &[ZONE_11, digit_row(7), digit_row(8)]),
    (',', &[ZONE_0, digit_row(3), digit_row(8)]),
    ('%', &[ZONE_0, digit_row(4), digit_row(8)]),
    ('_', &[ZONE_0, digit_row(5), digit_row(8)]),
    ('>', &[ZONE_0, digit_row(6), digit_row(8)]),
    ('?', &[ZONE_0, digit_row(7), digit_row(8)]),
    (':', &[digit_row(2), digit_row(8)]),
    ('#', &[digit_row(3), digit_row(8)]),
    ('@', &[digit_row(4), digit_row(8)]),
    ('\'', &[digit_row(5), digit_row(8)]),
    ('=', &[digit_row(6), digit_row(8)]),
    ('"', &[digit_row(7), digit_row(8)]),
];

/// Pattern for a character with a defined code, or `None`
pub fn lookup(c: char) -> Option<PunchPattern> {
    let c = c.to_ascii_uppercase();
    match c {
        ' ' => Some(PunchPattern::EMPTY),
        'A'..='I' => Some(PunchPattern::from_rows(&[ZONE_12, letter_digit(c, 'A', 1)])),
        'J'..='R' => Some(PunchPattern::from_rows(&[ZONE_11, letter_digit(c, 'J', 1)])),
        // S starts on digit 2; this band never uses the 1 row.
        'S'..='Z' => Some(PunchPattern::from_rows(&[ZONE_0, letter_digit(c, 'S', 2)])),
        '0'..='9' => Some(PunchPattern::from_rows(&[digit_row(c as u8 - b'0')])),
        _ => PUNCTUATION
            .iter()
            .find(|(p, _)| *p == c)
            .map(|(_, rows)| PunchPattern::from_rows(rows)),
    }
}

fn letter_digit(c: char, band_start: char, first_digit: u8) -> usize {
    digit_row(first_digit + (c as u8 - band_start as u8))
}

/// Punch pattern for one character; unknown characters get [`FALLBACK_PATTERN`]
pub fn encode_char(c: char) -> PunchPattern {
    lookup(c).unwrap_or_else(|| {
        debug!("No Hollerith code for {:?}, using 11-0 fallback", c);
        FALLBACK_PATTERN
    })
}

/// Whether `c` has a code of its own (not the fallback)
pub fn is_supported(c: char) -> bool {
    lookup(c).is_some()
}

/// Every character with a defined code, in table order
pub fn supported_chars() -> impl Iterator<Item = char> {
    std::iter::once(' ')
        .chain('A'..='Z')
        .chain('0'..='9')
        .chain(PUNCTUATION.iter().map(|(c, _)| *c))
}

/// Reverse lookup over the canonical table
pub fn decode_pattern(pattern: PunchPattern) -> Option<char> {
    supported_chars().find(|&c| lookup(c) == Some(pattern))
}

/// Read a 12-row card back into text; unknown columns become U+FFFD
pub fn decode_grid(grid: &Grid) -> String {
    (0..grid.cols())
        .map(|col| decode_pattern(PunchPattern::from_column(grid, col)).unwrap_or('\u{FFFD}'))
        .collect()
}

/// Mapping from physical punch rows onto the rows of a (possibly small) grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLayout {
    rows: Vec<PunchRow>,
}

impl RowLayout {
    pub fn new(rows: Vec<PunchRow>) -> Self {
        Self { rows }
    }

    /// The full card: 12, 11, 0, 1 .. 9
    pub fn standard() -> Self {
        Self::new((0..CARD_ROWS).filter_map(PunchRow::from_index).collect())
    }

    /// Grid height this layout needs
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Grid row that carries a canonical row index, if the layout has it
    pub fn grid_row(&self, canonical: usize) -> Option<usize> {
        self.rows.iter().position(|r| r.index() == Some(canonical))
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.rows
            .iter()
            .filter_map(|r| r.index().and_then(row_label))
            .collect()
    }
}

impl Default for RowLayout {
    fn default() -> Self {
        Self::standard()
    }
}

/// Encode text onto a full 12-row card, one character per column.
///
/// The grid is `min(chars, max_columns)` wide; extra characters are dropped.
pub fn encode_message(message: &str, max_columns: usize) -> Grid {
    encode_message_with_layout(message, max_columns, &RowLayout::standard())
}

/// Encode text onto a grid whose rows follow `layout`. Punches on rows the
/// layout does not carry are dropped.
pub fn encode_message_with_layout(message: &str, max_columns: usize, layout: &RowLayout) -> Grid {
    let chars: Vec<char> = message.chars().take(max_columns).collect();
    let dropped = message.chars().count() - chars.len();
    if dropped > 0 {
        debug!("Message truncated to {} columns ({} dropped)", max_columns, dropped);
    }

    let mut grid = Grid::new(layout.height(), chars.len());
    for (col, &c) in chars.iter().enumerate() {
        for canonical in encode_char(c).rows() {
            if let Some(row) = layout.grid_row(canonical) {
                grid.set(row, col, true);
            }
        }
    }
    grid
}

/// Encode text onto a blank `rows` x `columns` card, optionally centered
/// horizontally. Used to show a message between animations.
pub fn encode_card(message: &str, rows: usize, columns: usize, center: bool) -> Grid {
    let encoded = encode_message(message, columns);
    let offset = if center {
        (columns - encoded.cols()) / 2
    } else {
        0
    };
    let mut card = Grid::new(rows, columns);
    card.paste(&encoded, offset);
    card
}
