//! Property-based invariant tests for the encoder and the animation frames.
//!
//! 1. Encoding is deterministic and one column per character.
//! 2. Every supported character decodes back to itself.
//! 3. Row labels and row indices agree.
//! 4. Startup and wake waves start and end blank and never light more than
//!    `trail` diagonals.
//! 5. The sleep fade only ever turns cells off.
//! 6. Frame rate and speed always produce a usable tick interval.

use std::collections::BTreeSet;

use proptest::prelude::*;
use punchcard_core::animation::{sleep_steps, startup_steps, wake_steps};
use punchcard_core::hollerith::{
    decode_grid, encode_message, row_label, supported_chars, PunchPattern, PunchRow, CARD_ROWS,
};
use punchcard_core::scheduler::{tick_interval_ms, MIN_TICK_MS};
use punchcard_core::Grid;

// ── Helpers ─────────────────────────────────────────────────────────────

fn message_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(supported_chars().collect::<Vec<_>>()), 0..40)
        .prop_map(|chars| chars.into_iter().collect())
}

fn lit_diagonals(grid: &Grid) -> BTreeSet<usize> {
    grid.lit_cells().map(|(r, c)| r + c).collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Encoding
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn encode_is_deterministic(message in ".{0,60}", columns in 0usize..100) {
        prop_assert_eq!(encode_message(&message, columns), encode_message(&message, columns));
    }

    #[test]
    fn encode_width_is_truncated_length(message in ".{0,60}", columns in 0usize..100) {
        let grid = encode_message(&message, columns);
        prop_assert_eq!(grid.rows(), CARD_ROWS);
        prop_assert_eq!(grid.cols(), message.chars().count().min(columns));
    }

    #[test]
    fn supported_text_decodes_back(message in message_strategy()) {
        let grid = encode_message(&message, 80);
        prop_assert_eq!(decode_grid(&grid), message);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Row labels
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn label_and_index_agree(index in 0usize..CARD_ROWS) {
        let label = row_label(index).unwrap();
        let row = PunchRow::from_label(label).unwrap();
        prop_assert_eq!(row.index(), Some(index));
        prop_assert_eq!(PunchRow::from_index(index), Some(row));
    }

    #[test]
    fn pattern_label_parses_back(rows in prop::collection::btree_set(0usize..CARD_ROWS, 0..5)) {
        let rows: Vec<usize> = rows.into_iter().collect();
        let pattern = PunchPattern::from_rows(&rows);
        prop_assert_eq!(PunchPattern::parse_label(&pattern.label()), Some(pattern));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Waves
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn startup_band_never_exceeds_trail(
        rows in 1usize..16,
        cols in 1usize..40,
        trail in 1usize..20,
        drain in 0usize..5,
    ) {
        let steps = startup_steps(rows, cols, trail, drain);
        prop_assert_eq!(steps.len(), rows + cols + trail + drain);
        prop_assert!(steps.first().unwrap().is_blank());
        prop_assert!(steps.last().unwrap().is_blank());

        for step in &steps {
            let band = lit_diagonals(step);
            prop_assert!(band.len() <= trail);
            if let (Some(lo), Some(hi)) = (band.first(), band.last()) {
                // contiguous band of whole diagonals
                prop_assert_eq!(hi - lo + 1, band.len());
            }
        }
    }

    #[test]
    fn wake_ends_with_blank_drain(
        rows in 1usize..16,
        cols in 1usize..40,
        trail in 1usize..20,
        drain in 0usize..6,
    ) {
        let steps = wake_steps(rows, cols, trail, drain);
        let wave = rows + cols + trail;
        prop_assert_eq!(steps.len(), wave + drain.max(1));
        prop_assert!(steps[wave..].iter().all(Grid::is_blank));
    }

    #[test]
    fn sleep_only_turns_cells_off(
        cells in prop::collection::vec(any::<bool>(), 1..=12 * 20),
        cols in 1usize..=20,
    ) {
        let rows = (cells.len() / cols).max(1);
        let start = Grid::from_fn(rows, cols, |r, c| cells.get(r * cols + c).copied().unwrap_or(false));
        let steps = sleep_steps(&start);

        prop_assert_eq!(steps.first(), Some(&start));
        prop_assert!(steps.last().unwrap().is_blank());
        for pair in steps.windows(2) {
            for (r, c) in pair[1].lit_cells() {
                prop_assert!(pair[0].get(r, c));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Timing
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn tick_interval_has_floor(fps in 0u32..200, speed in 0.01f64..100.0) {
        prop_assert!(tick_interval_ms(fps, speed) >= MIN_TICK_MS);
    }
}
