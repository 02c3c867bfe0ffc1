use anyhow::Result;

use punchcard_core::hollerith::{self, RowLayout};

pub fn run(text: &str, columns: usize) -> Result<()> {
    let grid = hollerith::encode_message(text, columns);
    if grid.cols() == 0 {
        println!("Nothing to punch.");
        return Ok(());
    }

    println!("Column  Char  Rows");
    for (col, c) in text.chars().take(columns).enumerate() {
        let pattern = hollerith::encode_char(c);
        let note = if hollerith::is_supported(c) { "" } else { "  (no code, fallback)" };
        println!("{:>6}  {:>4}  {}{}", col + 1, format!("{:?}", c), pattern, note);
    }

    let dropped = text.chars().count().saturating_sub(columns);
    if dropped > 0 {
        println!("({} characters past column {} dropped)", dropped, columns);
    }

    println!();
    for (row, label) in RowLayout::standard().labels().iter().enumerate() {
        let cells: String = grid
            .row(row)
            .iter()
            .map(|&lit| if lit { '#' } else { '.' })
            .collect();
        println!("{:>3} {}", label, cells);
    }

    Ok(())
}
