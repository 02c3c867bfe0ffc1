use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::events::AnimationEvent;
use super::player::{AnimationPlayer, PlayRequest, PlaybackState, TickOutcome};
use crate::animation::AnimationKind;
use crate::grid::Grid;
use crate::{Error, Result};

/// Commands queued by handles and served by the scheduler loop
const COMMAND_QUEUE: usize = 32;

enum Command {
    Play {
        request: PlayRequest,
        reply: oneshot::Sender<bool>,
    },
    Interrupt {
        reply: oneshot::Sender<bool>,
    },
    SetFps {
        fps: u32,
        reply: oneshot::Sender<u32>,
    },
    Status {
        reply: oneshot::Sender<PlaybackStatus>,
    },
    Display {
        grid: Grid,
        reply: oneshot::Sender<bool>,
    },
    Subscribe {
        reply: oneshot::Sender<mpsc::UnboundedReceiver<AnimationEvent>>,
    },
}

/// Point-in-time view of the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackStatus {
    pub state: PlaybackState,
    pub kind: Option<AnimationKind>,
    /// Next step to be applied
    pub index: Option<usize>,
    pub total: Option<usize>,
    pub fps: u32,
}

/// Drives an [`AnimationPlayer`] from a tokio interval.
///
/// The service owns the player; everything else talks to it through a
/// [`SchedulerHandle`]. Every applied frame is published on the player's
/// watch channel.
pub struct SchedulerService {
    player: AnimationPlayer,
    commands: mpsc::Receiver<Command>,
    auto_play_startup: bool,
}

impl SchedulerService {
    pub fn new(player: AnimationPlayer, auto_play_startup: bool) -> (Self, SchedulerHandle) {
        let (tx, commands) = mpsc::channel(COMMAND_QUEUE);
        let handle = SchedulerHandle {
            tx,
            frames: player.watch_frames(),
        };
        let service = Self {
            player,
            commands,
            auto_play_startup,
        };
        (service, handle)
    }

    /// Subscribe before `run`, so the auto-played startup is observed too
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<AnimationEvent> {
        self.player.subscribe()
    }

    /// Serve commands and play frames until the shutdown signal
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let Self {
            mut player,
            mut commands,
            auto_play_startup,
        } = self;

        info!(
            "Scheduler started: {}x{} grid, {} fps, hardware={}",
            player.grid().rows(),
            player.grid().cols(),
            player.fps(),
            player.hardware().name()
        );

        let mut ticker = None;
        if auto_play_startup && player.play(PlayRequest::new(AnimationKind::Startup)) {
            ticker = arm(&player);
        }
        let mut commands_open = true;

        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Scheduler received shutdown signal");
                        break;
                    }
                }

                command = commands.recv(), if commands_open => {
                    match command {
                        Some(command) => handle_command(&mut player, &mut ticker, command),
                        None => {
                            debug!("All scheduler handles dropped");
                            commands_open = false;
                        }
                    }
                }

                _ = next_tick(&mut ticker) => {
                    if !matches!(player.tick(), TickOutcome::Stepped { .. }) {
                        ticker = None;
                    }
                }
            }
        }

        if player.interrupt() {
            debug!("Stopped playback on shutdown");
        }
    }
}

fn handle_command(
    player: &mut AnimationPlayer,
    ticker: &mut Option<Interval>,
    command: Command,
) {
    match command {
        Command::Play { request, reply } => {
            let started = player.play(request);
            if started {
                *ticker = arm(player);
            }
            send_reply(reply, started);
        }
        Command::Interrupt { reply } => {
            let stopped = player.interrupt();
            if stopped {
                *ticker = None;
            }
            send_reply(reply, stopped);
        }
        Command::SetFps { fps, reply } => {
            let fps = player.set_fps(fps);
            if ticker.is_some() {
                *ticker = arm(player);
            }
            send_reply(reply, fps);
        }
        Command::Status { reply } => {
            send_reply(
                reply,
                PlaybackStatus {
                    state: player.state(),
                    kind: player.current_kind().cloned(),
                    index: player.current_index(),
                    total: player.total_steps(),
                    fps: player.fps(),
                },
            );
        }
        Command::Display { grid, reply } => send_reply(reply, player.display(&grid)),
        Command::Subscribe { reply } => send_reply(reply, player.subscribe()),
    }
}

fn send_reply<T>(reply: oneshot::Sender<T>, value: T) {
    if reply.send(value).is_err() {
        warn!("Failed to send scheduler reply: caller went away");
    }
}

/// A fresh interval for the running session; the first tick is one period out
fn arm(player: &AnimationPlayer) -> Option<Interval> {
    let period: Duration = player.tick_interval()?;
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(interval)
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Cloneable client of a running [`SchedulerService`]
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: mpsc::Sender<Command>,
    frames: watch::Receiver<Grid>,
}

impl SchedulerHandle {
    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| Error::SchedulerClosed)?;
        rx.await.map_err(|_| Error::SchedulerClosed)
    }

    /// Returns whether the animation started
    pub async fn play(&self, request: PlayRequest) -> Result<bool> {
        self.request(|reply| Command::Play { request, reply }).await
    }

    /// Returns whether a session was stopped
    pub async fn interrupt(&self) -> Result<bool> {
        self.request(|reply| Command::Interrupt { reply }).await
    }

    /// Returns the frame rate in effect after clamping
    pub async fn set_fps(&self, fps: u32) -> Result<u32> {
        self.request(|reply| Command::SetFps { fps, reply }).await
    }

    pub async fn status(&self) -> Result<PlaybackStatus> {
        self.request(|reply| Command::Status { reply }).await
    }

    pub async fn state(&self) -> Result<PlaybackState> {
        Ok(self.status().await?.state)
    }

    /// Show a static grid; refused while an animation plays
    pub async fn display(&self, grid: Grid) -> Result<bool> {
        self.request(|reply| Command::Display { grid, reply }).await
    }

    pub async fn subscribe(&self) -> Result<mpsc::UnboundedReceiver<AnimationEvent>> {
        self.request(|reply| Command::Subscribe { reply }).await
    }

    /// Receiver that observes every published frame
    pub fn frames(&self) -> watch::Receiver<Grid> {
        self.frames.clone()
    }

    /// The most recently published frame
    pub fn snapshot(&self) -> Grid {
        self.frames.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationGenerator;
    use crate::hardware::VirtualLink;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::task::JoinHandle;

    struct Harness {
        handle: SchedulerHandle,
        shutdown: watch::Sender<bool>,
        task: JoinHandle<()>,
        events: mpsc::UnboundedReceiver<AnimationEvent>,
    }

    fn start(auto_play_startup: bool, fps: u32) -> Harness {
        let player = AnimationPlayer::new(
            3,
            4,
            AnimationGenerator::default(),
            Arc::new(VirtualLink::new()),
            fps,
        );
        let (mut service, handle) = SchedulerService::new(player, auto_play_startup);
        let events = service.subscribe();
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(service.run(shutdown_rx));
        Harness {
            handle,
            shutdown,
            task,
            events,
        }
    }

    impl Harness {
        async fn stop(self) {
            self.shutdown.send(true).unwrap();
            self.task.await.unwrap();
        }

        async fn wait_for(&mut self, wanted: impl Fn(&AnimationEvent) -> bool) -> Vec<AnimationEvent> {
            let mut seen = Vec::new();
            while let Some(event) = self.events.recv().await {
                let done = wanted(&event);
                seen.push(event);
                if done {
                    break;
                }
            }
            seen
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_plays_to_completion() {
        let mut harness = start(false, 30);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let started = harness
            .handle
            .play(PlayRequest::new(AnimationKind::Wake).on_complete(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .await
            .unwrap();
        assert!(started);

        let seen = harness
            .wait_for(|e| matches!(e, AnimationEvent::Finished { .. }))
            .await;
        let total = 3 + 4 + 8 + 4;
        assert_eq!(seen.len(), total + 2);
        assert_eq!(seen[0], AnimationEvent::Started { kind: AnimationKind::Wake });
        for (i, event) in seen[1..=total].iter().enumerate() {
            assert_eq!(event, &AnimationEvent::Step { index: i, total });
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(harness.handle.snapshot().is_blank());
        assert_eq!(harness.handle.state().await.unwrap(), PlaybackState::Idle);

        harness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_step_event_sees_its_frame() {
        let mut harness = start(false, 30);
        let expected = AnimationGenerator::default().generate(&AnimationKind::Startup, 3, 4, None);
        harness.handle.play(PlayRequest::new(AnimationKind::Startup)).await.unwrap();

        loop {
            match harness.events.recv().await {
                Some(AnimationEvent::Step { index, .. }) => {
                    assert_eq!(&harness.handle.snapshot(), expected.step(index).unwrap());
                }
                Some(AnimationEvent::Finished { .. }) | None => break,
                Some(_) => {}
            }
        }

        harness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_and_interrupting_play() {
        let harness = start(false, 30);
        let handle = &harness.handle;

        assert!(handle.play(PlayRequest::new(AnimationKind::Startup)).await.unwrap());
        assert!(!handle.play(PlayRequest::new(AnimationKind::Wake)).await.unwrap());
        assert!(handle
            .play(PlayRequest::new(AnimationKind::Wake).interrupting())
            .await
            .unwrap());

        let status = handle.status().await.unwrap();
        assert_eq!(status.state, PlaybackState::Playing);
        assert_eq!(status.kind, Some(AnimationKind::Wake));
        assert_eq!(status.index, Some(0));

        harness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_stops_ticking() {
        let mut harness = start(false, 30);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        harness
            .handle
            .play(PlayRequest::new(AnimationKind::Startup).on_complete(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .await
            .unwrap();
        harness
            .wait_for(|e| matches!(e, AnimationEvent::Step { index: 2, .. }))
            .await;

        assert!(harness.handle.interrupt().await.unwrap());
        assert_eq!(
            harness.events.recv().await,
            Some(AnimationEvent::Interrupted { kind: AnimationKind::Startup })
        );
        let frozen = harness.handle.snapshot();
        assert_eq!(frozen.count_lit(), 3);

        time::sleep(Duration::from_secs(5)).await;
        assert!(harness.events.try_recv().is_err());
        assert_eq!(harness.handle.snapshot(), frozen);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!harness.handle.interrupt().await.unwrap());

        harness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_fps_sets_step_timing() {
        let mut harness = start(false, 30);
        assert_eq!(harness.handle.set_fps(500).await.unwrap(), 60);
        assert_eq!(harness.handle.set_fps(10).await.unwrap(), 10);

        let begin = Instant::now();
        harness
            .handle
            .play(PlayRequest::new(AnimationKind::Startup))
            .await
            .unwrap();
        harness
            .wait_for(|e| matches!(e, AnimationEvent::Finished { .. }))
            .await;

        // 21 frames plus the completing tick, 100ms apart
        let elapsed = begin.elapsed();
        assert!(elapsed >= Duration::from_millis(2200), "{:?}", elapsed);
        assert!(elapsed < Duration::from_millis(2400), "{:?}", elapsed);

        harness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_play_startup() {
        let mut harness = start(true, 30);
        assert_eq!(
            harness.events.recv().await,
            Some(AnimationEvent::Started { kind: AnimationKind::Startup })
        );
        harness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_display_publishes_frame() {
        let harness = start(false, 30);
        let mut frames = harness.handle.frames();
        let grid = Grid::from_fn(3, 4, |r, c| r == 1 && c > 1);

        assert!(harness.handle.display(grid.clone()).await.unwrap());
        frames.changed().await.unwrap();
        assert_eq!(*frames.borrow(), grid);

        harness.handle.play(PlayRequest::new(AnimationKind::Startup)).await.unwrap();
        assert!(!harness.handle.display(Grid::new(3, 4)).await.unwrap());

        harness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_errors_after_shutdown() {
        let harness = start(false, 30);
        let handle = harness.handle.clone();
        harness.stop().await;

        assert!(matches!(handle.status().await, Err(Error::SchedulerClosed)));
    }
}
