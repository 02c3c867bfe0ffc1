//! Custom animation resources
//!
//! JSON documents with ordered phases of explicit frames:
//!
//! ```json
//! {
//!   "name": "marquee",
//!   "fps": 20,
//!   "interruptible": true,
//!   "phases": [
//!     { "steps": [[[true, false], [false, true]]], "transition_pause": 250 }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::{Error, Result};

/// Longest hold a single transition pause may expand to
pub const MAX_HOLD_FRAMES: usize = 600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomAnimation {
    pub name: String,
    /// Frame rate the frames were authored for; sizes transition pauses
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Whether a new `play` may cut this animation short
    #[serde(default = "default_true")]
    pub interruptible: bool,
    pub phases: Vec<AnimationPhase>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationPhase {
    #[serde(default)]
    pub name: Option<String>,
    /// Full-grid frames, each a list of rows
    pub steps: Vec<Vec<Vec<bool>>>,
    /// Hold after the phase, in milliseconds
    #[serde(default)]
    pub transition_pause: u64,
}

fn default_fps() -> u32 {
    30
}

fn default_true() -> bool {
    true
}

impl CustomAnimation {
    pub fn from_json(content: &str) -> Result<Self> {
        let animation: CustomAnimation = serde_json::from_str(content)?;
        if animation.phases.is_empty() {
            return Err(Error::Resource(format!("'{}' has no phases", animation.name)));
        }
        Ok(animation)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Hold frames that realise a transition pause at the authored frame rate.
    /// Pauses longer than [`MAX_HOLD_FRAMES`] are a resource error.
    pub fn hold_frames(&self, pause_ms: u64) -> Result<usize> {
        let fps = u64::from(self.fps.max(1));
        pause_ms
            .checked_mul(fps)
            .and_then(|n| n.checked_add(500))
            .map(|n| n / 1000)
            .and_then(|n| usize::try_from(n).ok())
            .filter(|&hold| hold <= MAX_HOLD_FRAMES)
            .ok_or_else(|| {
                Error::Resource(format!(
                    "transition pause of {}ms in '{}' exceeds {} frames",
                    pause_ms, self.name, MAX_HOLD_FRAMES
                ))
            })
    }

    /// Flatten all phases into frames for a `rows` x `cols` display.
    ///
    /// Every frame must match the display exactly; pauses repeat the last
    /// frame of their phase.
    pub fn to_steps(&self, rows: usize, cols: usize) -> Result<Vec<Grid>> {
        let mut steps = Vec::new();

        for (p, phase) in self.phases.iter().enumerate() {
            if phase.steps.is_empty() {
                return Err(Error::Resource(format!("phase {} of '{}' has no steps", p, self.name)));
            }
            for (s, raw) in phase.steps.iter().enumerate() {
                let grid = Grid::from_rows(raw)
                    .filter(|g| g.dimensions() == (rows, cols))
                    .ok_or_else(|| {
                        Error::Resource(format!(
                            "step {} of phase {} in '{}' is not {}x{}",
                            s, p, self.name, rows, cols
                        ))
                    })?;
                steps.push(grid);
            }

            let hold = self.hold_frames(phase.transition_pause)?;
            if let Some(last) = steps.last().cloned() {
                steps.extend(std::iter::repeat(last).take(hold));
            }
        }

        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARQUEE: &str = r#"{
        "name": "marquee",
        "fps": 10,
        "phases": [
            { "name": "on", "steps": [[[true, false], [false, true]]], "transition_pause": 200 },
            { "steps": [[[false, false], [false, false]]] }
        ]
    }"#;

    #[test]
    fn test_parse_defaults() {
        let animation = CustomAnimation::from_json(MARQUEE).unwrap();
        assert_eq!(animation.fps, 10);
        assert!(animation.interruptible);
        assert_eq!(animation.phases[1].transition_pause, 0);
    }

    #[test]
    fn test_pause_becomes_hold_frames() {
        let animation = CustomAnimation::from_json(MARQUEE).unwrap();
        let steps = animation.to_steps(2, 2).unwrap();
        // 1 frame + 2 hold frames (200ms at 10fps) + 1 frame
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[0], steps[2]);
        assert!(steps[3].is_blank());
    }

    #[test]
    fn test_pause_overflow_rejected() {
        let mut animation = CustomAnimation::from_json(MARQUEE).unwrap();
        assert!(matches!(animation.hold_frames(u64::MAX), Err(Error::Resource(_))));
        assert_eq!(animation.hold_frames(60_000).unwrap(), 600);
        assert!(animation.hold_frames(60_100).is_err());

        animation.phases[0].transition_pause = u64::MAX;
        assert!(matches!(animation.to_steps(2, 2), Err(Error::Resource(_))));
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let animation = CustomAnimation::from_json(MARQUEE).unwrap();
        assert!(matches!(animation.to_steps(12, 80), Err(Error::Resource(_))));
    }

    #[test]
    fn test_no_phases_rejected() {
        let err = CustomAnimation::from_json(r#"{"name": "empty", "phases": []}"#).unwrap_err();
        assert!(matches!(err, Error::Resource(_)));
    }

    #[test]
    fn test_garbage_is_json_error() {
        assert!(matches!(CustomAnimation::from_json("{nope"), Err(Error::Json(_))));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = std::env::temp_dir().join(format!("punchcard-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("marquee.json");
        std::fs::write(&path, MARQUEE).unwrap();

        let animation = CustomAnimation::load(&path).unwrap();
        assert_eq!(animation.name, "marquee");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
