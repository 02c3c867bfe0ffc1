use std::sync::atomic::{AtomicU64, Ordering};

use super::HardwareLink;
use crate::grid::Grid;
use crate::Result;

/// Stand-in for absent hardware: always ready, drops every frame
#[derive(Debug, Default)]
pub struct VirtualLink {
    discarded: AtomicU64,
}

impl VirtualLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames handed to this link so far
    pub fn frames_discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }
}

impl HardwareLink for VirtualLink {
    fn name(&self) -> &str {
        "virtual"
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn is_virtual(&self) -> bool {
        true
    }

    fn update(&self, _grid: &Grid) -> Result<()> {
        self.discarded.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
