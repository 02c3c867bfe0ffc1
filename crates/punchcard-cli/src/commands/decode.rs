use anyhow::{anyhow, Result};

use punchcard_core::hollerith::{self, PunchPattern};

/// Decode one row list per column, e.g. `12,1 12,2` -> "AB"
pub fn run(patterns: &[String]) -> Result<()> {
    let text = decode(patterns)?;
    println!("{}", text);
    Ok(())
}

fn decode(patterns: &[String]) -> Result<String> {
    patterns
        .iter()
        .map(|label| {
            let pattern = PunchPattern::parse_label(label)
                .ok_or_else(|| anyhow!("'{}' is not a row list (rows are 12, 11, 0-9)", label))?;
            Ok(hollerith::decode_pattern(pattern).unwrap_or('\u{FFFD}'))
        })
        .collect()
}
