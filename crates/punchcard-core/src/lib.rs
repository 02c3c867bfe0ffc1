pub mod animation;
pub mod config;
pub mod error;
pub mod grid;
pub mod hardware;
pub mod hollerith;
pub mod scheduler;

pub use animation::{AnimationGenerator, AnimationKind, AnimationSequence};
pub use config::AppConfig;
pub use error::{Error, Result};
pub use grid::Grid;
pub use hollerith::{encode_card, encode_char, encode_message, PunchPattern, PunchRow, RowLayout};
pub use scheduler::{AnimationEvent, AnimationPlayer, PlayRequest, PlaybackState, SchedulerHandle, SchedulerService};
