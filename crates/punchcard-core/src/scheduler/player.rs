//! Playback state machine
//!
//! `Idle -> Playing -> Completed -> Idle`, or `Playing -> Idle` when a session
//! is interrupted. Each [`AnimationPlayer::tick`] applies one precomputed
//! frame; the caller owns the timer and asks [`AnimationPlayer::tick_interval`]
//! how often to tick.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::events::{AnimationEvent, EventEmitter};
use crate::animation::{AnimationGenerator, AnimationKind, AnimationSequence};
use crate::grid::Grid;
use crate::hardware::HardwareLink;

pub const MIN_FPS: u32 = 1;
pub const MAX_FPS: u32 = 60;
/// Floor on the tick interval: at most 50 ticks per second at any speed
pub const MIN_TICK_MS: u64 = 20;

/// Called once when a session plays to the end; never on interruption
pub type CompletionCallback = Box<dyn FnOnce(&AnimationKind) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    /// Reserved; no operation currently pauses a session
    Paused,
    Completed,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Completed => "completed",
        };
        f.write_str(s)
    }
}

/// Arguments of a `play` call
pub struct PlayRequest {
    pub kind: AnimationKind,
    /// Replace a running session instead of being rejected
    pub interrupt: bool,
    /// Playback speed multiplier
    pub speed: f64,
    pub callback: Option<CompletionCallback>,
}

impl PlayRequest {
    pub fn new(kind: AnimationKind) -> Self {
        Self {
            kind,
            interrupt: false,
            speed: 1.0,
            callback: None,
        }
    }

    pub fn interrupting(mut self) -> Self {
        self.interrupt = true;
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn on_complete(mut self, callback: impl FnOnce(&AnimationKind) + Send + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for PlayRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayRequest")
            .field("kind", &self.kind)
            .field("interrupt", &self.interrupt)
            .field("speed", &self.speed)
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// What a tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing is playing
    Idle,
    /// Frame `index` of `total` is now on the grid
    Stepped { index: usize, total: usize },
    /// The session ran out of frames and was closed
    Completed(AnimationKind),
}

struct AnimationSession {
    sequence: AnimationSequence,
    index: usize,
    speed: f64,
    callback: Option<CompletionCallback>,
}

/// Tick interval in milliseconds for a frame rate and speed multiplier
pub fn tick_interval_ms(fps: u32, speed: f64) -> u64 {
    let ms = (1000.0 / (f64::from(fps.max(MIN_FPS)) * speed)).round();
    if ms.is_finite() {
        (ms as u64).max(MIN_TICK_MS)
    } else {
        MIN_TICK_MS
    }
}

/// Owner of the display grid and the one active animation session
pub struct AnimationPlayer {
    grid: Grid,
    generator: AnimationGenerator,
    hardware: Arc<dyn HardwareLink>,
    session: Option<AnimationSession>,
    state: PlaybackState,
    fps: u32,
    events: EventEmitter,
    /// Latest grid, replaced before any event about it is emitted
    frames: watch::Sender<Grid>,
}

impl AnimationPlayer {
    pub fn new(
        rows: usize,
        cols: usize,
        generator: AnimationGenerator,
        hardware: Arc<dyn HardwareLink>,
        fps: u32,
    ) -> Self {
        let grid = Grid::new(rows, cols);
        let (frames, _) = watch::channel(grid.clone());
        Self {
            grid,
            generator,
            hardware,
            session: None,
            state: PlaybackState::Idle,
            fps: fps.clamp(MIN_FPS, MAX_FPS),
            events: EventEmitter::new(),
            frames,
        }
    }

    /// Receiver of every grid the player shows
    pub fn watch_frames(&self) -> watch::Receiver<Grid> {
        self.frames.subscribe()
    }

    pub fn subscribe(&mut self) -> tokio::sync::mpsc::UnboundedReceiver<AnimationEvent> {
        self.events.subscribe()
    }

    /// Start an animation. Returns `false`, changing nothing, when a session is
    /// playing and the request does not interrupt it (or the running sequence
    /// refuses interruption).
    pub fn play(&mut self, request: PlayRequest) -> bool {
        if let Some(session) = &self.session {
            if !request.interrupt {
                debug!(
                    "Ignoring play({}): {} is still playing",
                    request.kind,
                    session.sequence.kind()
                );
                return false;
            }
            if !session.sequence.is_interruptible() {
                warn!(
                    "Ignoring play({}): {} cannot be interrupted",
                    request.kind,
                    session.sequence.kind()
                );
                return false;
            }
            self.stop();
        }

        let speed = if request.speed.is_finite() && request.speed > 0.0 {
            request.speed
        } else {
            warn!("Invalid playback speed {}, using 1.0", request.speed);
            1.0
        };

        let (rows, cols) = self.grid.dimensions();
        let sequence = self.generator.generate(&request.kind, rows, cols, Some(&self.grid));
        info!(
            "Playing {} ({} steps, {}ms/step)",
            request.kind,
            sequence.len(),
            tick_interval_ms(self.fps, speed)
        );

        self.session = Some(AnimationSession {
            sequence,
            index: 0,
            speed,
            callback: request.callback,
        });
        self.state = PlaybackState::Playing;
        self.events.emit(AnimationEvent::Started { kind: request.kind });
        true
    }

    /// Apply the next frame, or close the session once every frame was shown
    pub fn tick(&mut self) -> TickOutcome {
        let finished = match &self.session {
            None => return TickOutcome::Idle,
            Some(session) => session.index >= session.sequence.len(),
        };
        if finished {
            return self.complete();
        }

        let Some(session) = self.session.as_mut() else {
            return TickOutcome::Idle;
        };
        let index = session.index;
        let total = session.sequence.len();
        if let Some(frame) = session.sequence.step(index) {
            self.grid.apply(frame);
        }
        session.index += 1;

        self.frames.send_replace(self.grid.clone());
        self.mirror_to_hardware(index);
        self.events.emit(AnimationEvent::Step { index, total });
        TickOutcome::Stepped { index, total }
    }

    fn complete(&mut self) -> TickOutcome {
        let Some(session) = self.session.take() else {
            return TickOutcome::Idle;
        };
        self.state = PlaybackState::Completed;
        let kind = session.sequence.kind().clone();
        debug!("{} finished after {} steps", kind, session.sequence.len());
        self.state = PlaybackState::Idle;

        if let Some(callback) = session.callback {
            callback(&kind);
        }
        self.events.emit(AnimationEvent::Finished { kind: kind.clone() });
        TickOutcome::Completed(kind)
    }

    fn mirror_to_hardware(&self, index: usize) {
        if !self.hardware.is_ready() || self.hardware.is_virtual() {
            return;
        }
        if let Err(e) = self.hardware.update(&self.grid) {
            warn!("Hardware sync via {} failed at step {}: {}", self.hardware.name(), index, e);
        }
    }

    fn stop(&mut self) -> Option<AnimationKind> {
        let session = self.session.take()?;
        let kind = session.sequence.kind().clone();
        self.state = PlaybackState::Idle;
        info!("Interrupted {} at step {}/{}", kind, session.index, session.sequence.len());
        self.events.emit(AnimationEvent::Interrupted { kind: kind.clone() });
        Some(kind)
    }

    /// Stop the running session, leaving the grid as its last applied frame.
    /// Returns `false` when nothing was playing.
    pub fn interrupt(&mut self) -> bool {
        self.stop().is_some()
    }

    /// Set the frame rate (clamped to 1..=60) and return the value in effect
    pub fn set_fps(&mut self, fps: u32) -> u32 {
        self.fps = fps.clamp(MIN_FPS, MAX_FPS);
        if fps != self.fps {
            debug!("Requested {} fps, clamped to {}", fps, self.fps);
        }
        self.fps
    }

    /// Show a static grid (e.g. an encoded message). Refused while playing.
    pub fn display(&mut self, grid: &Grid) -> bool {
        if self.state == PlaybackState::Playing {
            debug!("Ignoring display request during playback");
            return false;
        }
        self.grid.apply(grid);
        self.frames.send_replace(self.grid.clone());
        self.mirror_to_hardware(0);
        true
    }

    /// Time between ticks for the running session, `None` when idle
    pub fn tick_interval(&self) -> Option<Duration> {
        self.session
            .as_ref()
            .map(|s| Duration::from_millis(tick_interval_ms(self.fps, s.speed)))
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn hardware(&self) -> &Arc<dyn HardwareLink> {
        &self.hardware
    }

    pub fn current_kind(&self) -> Option<&AnimationKind> {
        self.session.as_ref().map(|s| s.sequence.kind())
    }

    /// Index of the next frame to apply
    pub fn current_index(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.index)
    }

    pub fn total_steps(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.sequence.len())
    }
}
