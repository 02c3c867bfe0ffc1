use tokio::sync::mpsc;
use tracing::trace;

use crate::animation::AnimationKind;

/// Playback notifications for renderers and other observers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationEvent {
    /// A new session began at step 0
    Started { kind: AnimationKind },
    /// Step `index` of `total` was applied to the grid
    Step { index: usize, total: usize },
    /// The session played every step
    Finished { kind: AnimationKind },
    /// The session was stopped early
    Interrupted { kind: AnimationKind },
}

/// Fan-out of [`AnimationEvent`]s to any number of subscribers.
///
/// Subscribers whose receiver was dropped are forgotten on the next emit.
#[derive(Debug, Default)]
pub struct EventEmitter {
    subscribers: Vec<mpsc::UnboundedSender<AnimationEvent>>,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<AnimationEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn emit(&mut self, event: AnimationEvent) {
        let before = self.subscribers.len();
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        if self.subscribers.len() < before {
            trace!("Dropped {} closed event subscribers", before - self.subscribers.len());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
