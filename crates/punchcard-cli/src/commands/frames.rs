use anyhow::Result;

use punchcard_core::hollerith;
use punchcard_core::{AnimationGenerator, AnimationKind, AppConfig};

pub fn run(
    config: &AppConfig,
    kind: &str,
    rows: usize,
    columns: usize,
    limit: Option<usize>,
    message: &str,
) -> Result<()> {
    let kind: AnimationKind = kind.parse()?;
    let generator = AnimationGenerator::from_config(config);

    // Sleep fades whatever is on the card
    let start = hollerith::encode_card(message, rows, columns, config.display.center_message);
    let sequence = generator.generate(&kind, rows, columns, Some(&start));

    println!(
        "{}: {} steps on {}x{}{}",
        kind,
        sequence.len(),
        rows,
        columns,
        if sequence.is_interruptible() { "" } else { " (not interruptible)" }
    );

    let shown = limit.unwrap_or(sequence.len());
    for (index, step) in sequence.steps().iter().take(shown).enumerate() {
        println!();
        println!("step {} ({} punched)", index, step.count_lit());
        println!("{}", step);
    }
    if shown < sequence.len() {
        println!();
        println!("... {} more steps", sequence.len() - shown);
    }

    Ok(())
}
