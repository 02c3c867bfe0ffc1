//! Precomputed grid animations
//!
//! Every animation is generated up front as a list of full-grid snapshots.
//! Playback only copies snapshots, so frame timing never depends on how
//! expensive an effect is to compute.

mod custom;
mod generator;

use std::fmt;
use std::str::FromStr;

pub use custom::{AnimationPhase, CustomAnimation};
pub use generator::{
    fallback_steps, sleep_steps, startup_steps, wake_steps, wave_lit, AnimationGenerator,
    SLEEP_FADE_STEPS,
};

use crate::grid::Grid;

/// Which effect to play
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    /// Diagonal punch wave followed by a clearing wave
    Startup,
    /// Fade the current card out along the diagonal
    Sleep,
    /// Short-trail wave with an explicit drain
    Wake,
    /// Named animation resource
    Custom(String),
}

impl fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimationKind::Startup => f.write_str("startup"),
            AnimationKind::Sleep => f.write_str("sleep"),
            AnimationKind::Wake => f.write_str("wake"),
            AnimationKind::Custom(name) => write!(f, "custom:{}", name),
        }
    }
}

impl FromStr for AnimationKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "startup" => Ok(AnimationKind::Startup),
            "sleep" => Ok(AnimationKind::Sleep),
            "wake" => Ok(AnimationKind::Wake),
            "custom" => Ok(AnimationKind::Custom("default".to_string())),
            _ => match s.split_once(':') {
                Some((prefix, name)) if prefix.eq_ignore_ascii_case("custom") && !name.is_empty() => {
                    Ok(AnimationKind::Custom(name.to_string()))
                }
                _ => Err(crate::Error::Other(format!(
                    "Unknown animation '{}' (expected startup, sleep, wake or custom:<name>)",
                    s
                ))),
            },
        }
    }
}

/// A finished, immutable list of frames ready for playback
#[derive(Debug, Clone)]
pub struct AnimationSequence {
    kind: AnimationKind,
    steps: Vec<Grid>,
    interruptible: bool,
}

impl AnimationSequence {
    pub fn new(kind: AnimationKind, steps: Vec<Grid>) -> Self {
        Self {
            kind,
            steps,
            interruptible: true,
        }
    }

    /// Mark whether a new `play` may cut this sequence short
    pub fn with_interruptible(mut self, interruptible: bool) -> Self {
        self.interruptible = interruptible;
        self
    }

    pub fn kind(&self) -> &AnimationKind {
        &self.kind
    }

    pub fn steps(&self) -> &[Grid] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&Grid> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_interruptible(&self) -> bool {
        self.interruptible
    }
}
