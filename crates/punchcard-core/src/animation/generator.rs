use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{debug, warn};

use super::custom::CustomAnimation;
use super::{AnimationKind, AnimationSequence};
use crate::config::{AnimationConfig, AppConfig};
use crate::grid::Grid;

/// Threshold steps of the sleep fade (the final blank frame comes on top)
pub const SLEEP_FADE_STEPS: usize = 10;

/// Checkerboard/blank cycles of the built-in custom fallback
const FALLBACK_CYCLES: usize = 6;

/// Whether cell diagonal `diagonal` (row + col) is lit at `step` of a wave
/// whose clearing edge trails the punching edge by `trail` diagonals.
///
/// The punching edge sits on diagonal `step - 1`, so step 0 is always blank
/// and at most `trail` diagonals are lit at once.
#[inline]
pub fn wave_lit(step: usize, diagonal: usize, trail: usize) -> bool {
    diagonal < step && step - diagonal <= trail
}

fn wave_frame(rows: usize, cols: usize, step: usize, trail: usize) -> Grid {
    Grid::from_fn(rows, cols, |r, c| wave_lit(step, r + c, trail))
}

/// Startup wave: `rows + cols + trail + drain` frames, first and last blank
pub fn startup_steps(rows: usize, cols: usize, trail: usize, drain: usize) -> Vec<Grid> {
    let total = rows + cols + trail + drain;
    (0..total)
        .map(|step| wave_frame(rows, cols, step, trail))
        .collect()
}

/// Wake wave: the startup wave over `rows + cols + trail` frames followed by
/// a drain phase of `drain` blank frames (at least one)
pub fn wake_steps(rows: usize, cols: usize, trail: usize, drain: usize) -> Vec<Grid> {
    let wave = rows + cols + trail;
    let mut steps: Vec<Grid> = (0..wave)
        .map(|step| wave_frame(rows, cols, step, trail))
        .collect();
    steps.extend((0..drain.max(1)).map(|_| Grid::new(rows, cols)));
    steps
}

/// Sleep fade from `start`: cells go dark once the rising threshold passes
/// their normalized diagonal position, then one blank frame
pub fn sleep_steps(start: &Grid) -> Vec<Grid> {
    let (rows, cols) = start.dimensions();
    let span = (rows + cols) as f64;
    let mut steps = Vec::with_capacity(SLEEP_FADE_STEPS + 1);

    if span > 0.0 {
        for i in 0..SLEEP_FADE_STEPS {
            let threshold = i as f64 / SLEEP_FADE_STEPS as f64;
            steps.push(Grid::from_fn(rows, cols, |r, c| {
                start.get(r, c) && (r + c) as f64 / span >= threshold
            }));
        }
    }
    steps.push(Grid::new(rows, cols));
    steps
}

/// Checkerboard/blank alternation used when no custom resource is usable
pub fn fallback_steps(rows: usize, cols: usize) -> Vec<Grid> {
    let checker = Grid::from_fn(rows, cols, |r, c| (r + c) % 2 == 0);
    let blank = Grid::new(rows, cols);
    (0..FALLBACK_CYCLES)
        .flat_map(|_| [checker.clone(), blank.clone()])
        .collect()
}

/// Builds complete frame sequences for every [`AnimationKind`]
#[derive(Debug, Clone)]
pub struct AnimationGenerator {
    startup_trail: usize,
    wake_trail: usize,
    startup_drain: usize,
    wake_drain: usize,
    custom_dir: Option<PathBuf>,
    registered: HashMap<String, CustomAnimation>,
}

impl Default for AnimationGenerator {
    fn default() -> Self {
        Self::new(&AnimationConfig::default())
    }
}

impl AnimationGenerator {
    /// Create a generator without a custom animation directory
    pub fn new(config: &AnimationConfig) -> Self {
        Self {
            startup_trail: config.startup_trail,
            wake_trail: config.wake_trail,
            startup_drain: config.startup_drain_steps,
            wake_drain: config.wake_drain_steps,
            custom_dir: None,
            registered: HashMap::new(),
        }
    }

    /// Create a generator that loads custom animations from the configured directory
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.animation).with_custom_dir(config.custom_animation_dir())
    }

    pub fn with_custom_dir(mut self, dir: PathBuf) -> Self {
        self.custom_dir = Some(dir);
        self
    }

    /// Make an in-memory custom animation available under its name.
    /// Registered animations take precedence over files.
    pub fn register(&mut self, animation: CustomAnimation) {
        self.registered.insert(animation.name.clone(), animation);
    }

    /// Generate the full frame list for `kind` on a `rows` x `cols` grid.
    ///
    /// `start` is the grid as currently displayed; only the sleep fade reads
    /// it, and it is copied once here. Never fails: an unusable custom
    /// resource yields the checkerboard fallback.
    pub fn generate(
        &self,
        kind: &AnimationKind,
        rows: usize,
        cols: usize,
        start: Option<&Grid>,
    ) -> AnimationSequence {
        let sequence = match kind {
            AnimationKind::Startup => AnimationSequence::new(
                kind.clone(),
                startup_steps(rows, cols, self.startup_trail, self.startup_drain),
            ),
            AnimationKind::Wake => AnimationSequence::new(
                kind.clone(),
                wake_steps(rows, cols, self.wake_trail, self.wake_drain),
            ),
            AnimationKind::Sleep => {
                let snapshot = match start {
                    Some(grid) if grid.dimensions() == (rows, cols) => grid.clone(),
                    Some(grid) => {
                        let mut fitted = Grid::new(rows, cols);
                        fitted.apply(grid);
                        fitted
                    }
                    None => Grid::new(rows, cols),
                };
                AnimationSequence::new(kind.clone(), sleep_steps(&snapshot))
            }
            AnimationKind::Custom(name) => self.generate_custom(kind, name, rows, cols),
        };

        debug!("Generated {} animation: {} steps", kind, sequence.len());
        sequence
    }

    fn generate_custom(
        &self,
        kind: &AnimationKind,
        name: &str,
        rows: usize,
        cols: usize,
    ) -> AnimationSequence {
        let loaded = match self.registered.get(name) {
            Some(animation) => Ok(animation.clone()),
            None => self.load_custom(name),
        };

        match loaded.and_then(|animation| {
            let steps = animation.to_steps(rows, cols)?;
            Ok((animation.interruptible, steps))
        }) {
            Ok((interruptible, steps)) => {
                AnimationSequence::new(kind.clone(), steps).with_interruptible(interruptible)
            }
            Err(e) => {
                warn!("Custom animation '{}' unusable, playing fallback: {}", name, e);
                AnimationSequence::new(kind.clone(), fallback_steps(rows, cols))
            }
        }
    }

    fn load_custom(&self, name: &str) -> crate::Result<CustomAnimation> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(crate::Error::Resource(format!("invalid animation name '{}'", name)));
        }
        let dir = self
            .custom_dir
            .as_ref()
            .ok_or_else(|| crate::Error::Resource("no custom animation directory".to_string()))?;
        CustomAnimation::load(&dir.join(format!("{}.json", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationPhase;

    fn lit_diagonals(grid: &Grid) -> Vec<usize> {
        let mut diagonals: Vec<usize> = grid.lit_cells().map(|(r, c)| r + c).collect();
        diagonals.sort_unstable();
        diagonals.dedup();
        diagonals
    }

    #[test]
    fn test_startup_shape() {
        let steps = startup_steps(12, 80, 12, 2);
        assert_eq!(steps.len(), 12 + 80 + 12 + 2);
        assert!(steps[0].is_blank());
        assert!(steps.last().unwrap().is_blank());
        assert!(steps[1].get(0, 0));
        assert_eq!(steps[1].count_lit(), 1);
    }

    #[test]
    fn test_startup_band_width() {
        for (i, step) in startup_steps(12, 80, 12, 2).iter().enumerate() {
            let diagonals = lit_diagonals(step);
            assert!(diagonals.len() <= 12, "step {i} lights {} diagonals", diagonals.len());
            if let (Some(first), Some(last)) = (diagonals.first(), diagonals.last()) {
                assert!(last - first < 12);
                assert_eq!(*last, (i - 1).min(12 + 80 - 2), "leading edge of step {i}");
            }
        }
    }

    #[test]
    fn test_wave_clears_behind() {
        let steps = startup_steps(3, 3, 2, 0);
        // diagonal 0 lit at steps 1 and 2, cleared at 3
        assert!(steps[1].get(0, 0));
        assert!(steps[2].get(0, 0));
        assert!(!steps[3].get(0, 0));
    }

    #[test]
    fn test_wake_ends_with_drain() {
        let steps = wake_steps(12, 80, 8, 4);
        assert_eq!(steps.len(), 12 + 80 + 8 + 4);
        assert!(steps[0].is_blank());
        assert!(steps[steps.len() - 4..].iter().all(Grid::is_blank));
        assert!(steps.iter().all(|s| lit_diagonals(s).len() <= 8));
    }

    #[test]
    fn test_wake_drain_never_empty() {
        let steps = wake_steps(2, 2, 1, 0);
        assert!(steps.last().unwrap().is_blank());
        assert_eq!(steps.len(), 2 + 2 + 1 + 1);
    }

    #[test]
    fn test_sleep_fades_from_current() {
        let mut start = Grid::new(12, 80);
        start.fill(true);
        let steps = sleep_steps(&start);
        assert_eq!(steps.len(), SLEEP_FADE_STEPS + 1);
        assert_eq!(steps[0], start);
        assert!(steps.last().unwrap().is_blank());
        for pair in steps.windows(2) {
            assert!(pair[1].count_lit() <= pair[0].count_lit());
        }
        // top-left corner goes first
        assert!(!steps[1].get(0, 0));
        assert!(steps[1].get(11, 79));
    }

    #[test]
    fn test_sleep_never_lights_new_cells() {
        let start = Grid::from_fn(4, 4, |r, c| r == c);
        for step in sleep_steps(&start) {
            assert!(step.lit_cells().all(|(r, c)| start.get(r, c)));
        }
    }

    #[test]
    fn test_generate_sleep_snapshots_start() {
        let generator = AnimationGenerator::default();
        let mut current = Grid::new(2, 2);
        current.set(1, 1, true);
        let sequence = generator.generate(&AnimationKind::Sleep, 2, 2, Some(&current));
        current.clear();
        assert!(sequence.steps()[0].get(1, 1));
    }

    #[test]
    fn test_fallback_shape() {
        let steps = fallback_steps(3, 4);
        assert_eq!(steps.len(), 12);
        assert!(steps[0].get(0, 0));
        assert!(!steps[0].get(0, 1));
        assert!(steps[1].is_blank());
        assert!(steps.last().unwrap().is_blank());
    }

    #[test]
    fn test_missing_custom_falls_back() {
        let generator = AnimationGenerator::default()
            .with_custom_dir(std::env::temp_dir().join("punchcard-missing-animations"));
        let kind = AnimationKind::Custom("nope".to_string());
        let sequence = generator.generate(&kind, 12, 80, None);
        assert_eq!(sequence.steps(), fallback_steps(12, 80).as_slice());
        assert!(sequence.is_interruptible());
    }

    fn custom_dir_with(files: &[(&str, &str)]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("punchcard-custom-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        for (name, content) in files {
            std::fs::write(dir.join(format!("{}.json", name)), content).unwrap();
        }
        dir
    }

    #[test]
    fn test_huge_pause_falls_back() {
        let dir = custom_dir_with(&[(
            "huge",
            r#"{"name": "huge", "phases": [
                {"steps": [[[true, false]]], "transition_pause": 18446744073709551615}
            ]}"#,
        )]);
        let generator = AnimationGenerator::default().with_custom_dir(dir.clone());
        let sequence = generator.generate(&AnimationKind::Custom("huge".to_string()), 1, 2, None);
        assert_eq!(sequence.steps(), fallback_steps(1, 2).as_slice());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_malformed_custom_files_fall_back() {
        let dir = custom_dir_with(&[
            ("garbage", "{not json"),
            ("wrong_size", r#"{"name": "wrong_size", "phases": [{"steps": [[[true]]]}]}"#),
            ("no_phases", r#"{"name": "no_phases", "phases": []}"#),
        ]);
        let generator = AnimationGenerator::default().with_custom_dir(dir.clone());
        for name in ["garbage", "wrong_size", "no_phases"] {
            let sequence = generator.generate(&AnimationKind::Custom(name.to_string()), 2, 3, None);
            assert_eq!(sequence.steps(), fallback_steps(2, 3).as_slice(), "{}", name);
            assert!(sequence.is_interruptible());
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_path_like_names_rejected() {
        let generator = AnimationGenerator::default().with_custom_dir(std::env::temp_dir());
        let kind = AnimationKind::Custom("../etc/passwd".to_string());
        assert_eq!(generator.generate(&kind, 2, 2, None).len(), 12);
    }

    #[test]
    fn test_registered_custom() {
        let mut generator = AnimationGenerator::default();
        generator.register(CustomAnimation {
            name: "blink".to_string(),
            fps: 10,
            interruptible: false,
            phases: vec![AnimationPhase {
                name: None,
                steps: vec![vec![vec![true, true]], vec![vec![false, false]]],
                transition_pause: 0,
            }],
        });
        let sequence = generator.generate(&AnimationKind::Custom("blink".to_string()), 1, 2, None);
        assert_eq!(sequence.len(), 2);
        assert!(!sequence.is_interruptible());
    }

    #[test]
    fn test_steps_are_independent() {
        let generator = AnimationGenerator::default();
        let sequence = generator.generate(&AnimationKind::Startup, 2, 2, None);
        let mut steps = sequence.steps().to_vec();
        steps[1].fill(true);
        assert_eq!(sequence.steps()[1].count_lit(), 1);
        assert_eq!(steps[2].count_lit(), 3);
    }
}
