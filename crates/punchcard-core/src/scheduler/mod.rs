mod events;
mod player;
mod service;

pub use events::{AnimationEvent, EventEmitter};
pub use player::{
    tick_interval_ms, AnimationPlayer, CompletionCallback, PlayRequest, PlaybackState,
    TickOutcome, MAX_FPS, MIN_FPS, MIN_TICK_MS,
};
pub use service::{PlaybackStatus, SchedulerHandle, SchedulerService};
