use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    Terminal,
};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use punchcard_core::{
    hardware, AnimationEvent, AnimationGenerator, AnimationKind, AnimationPlayer, AppConfig, Grid,
    PlayRequest, SchedulerHandle, SchedulerService,
};
use punchcard_tui::{
    event::{AppEvent, EventHandler},
    input::{handle_key_event, Action},
    widgets::{CardWidget, HelpWidget, StatusBarWidget},
    App, Theme,
};

pub async fn run(config: Arc<AppConfig>, message: &str, custom: &str) -> Result<()> {
    let rows = config.display.rows;
    let columns = config.display.columns;

    // Scheduler owns the grid; the UI only reads published frames
    let link = hardware::detect(&config).await;
    let player = AnimationPlayer::new(
        rows,
        columns,
        AnimationGenerator::from_config(&config),
        link.clone(),
        config.animation.fps,
    );
    let (mut scheduler, handle) = SchedulerService::new(player, config.animation.auto_play_startup);
    let mut events = scheduler.subscribe();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler_task = tokio::spawn(scheduler.run(shutdown_rx));

    let mut app = App::new(config.clone(), message, custom).with_theme(pick_theme());
    app.hardware_name = link.name().to_string();
    if !config.animation.auto_play_startup {
        handle.display(app.message_card.clone()).await?;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, SetTitle("punchcard"))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let size = terminal.size()?;
    app.on_resize(size.width, size.height);

    let event_handler = EventHandler::new(config.ui.tick_rate_ms);
    let mut frames = handle.frames();
    let result = run_loop(
        &mut terminal,
        &mut app,
        &handle,
        &mut events,
        &mut frames,
        &event_handler,
    )
    .await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    let _ = shutdown_tx.send(true);
    if let Err(e) = scheduler_task.await {
        error!("Scheduler task failed: {}", e);
    }
    info!("Display closed");

    result
}

async fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    handle: &SchedulerHandle,
    events: &mut mpsc::UnboundedReceiver<AnimationEvent>,
    frames: &mut watch::Receiver<Grid>,
    event_handler: &EventHandler,
) -> Result<()> {
    loop {
        // Drain scheduler notifications (non-blocking)
        while let Ok(event) = events.try_recv() {
            if app.on_event(event) {
                handle.display(app.message_card.clone()).await?;
            }
        }

        if frames.has_changed().unwrap_or(false) {
            let grid = frames.borrow_and_update().clone();
            app.set_grid(grid);
        }

        terminal.draw(|frame| {
            let size = frame.area();
            let main_layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(size);

            CardWidget::render(frame, card_area(main_layout[0], &app.grid), app);
            StatusBarWidget::render(frame, main_layout[1], app);
            if app.show_help {
                HelpWidget::render(frame, &app.theme);
            }
        })?;

        let wait = event_handler.wait_for(app.is_playing().then_some(app.fps));
        match event_handler.next(wait)? {
            AppEvent::Key(key) => {
                let action = handle_key_event(key, app);
                handle_action(app, handle, action).await?;
            }
            AppEvent::Resize { width, height } => app.on_resize(width, height),
            AppEvent::Redraw => {}
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// The card's natural size, clipped to the available area
fn card_area(area: Rect, grid: &Grid) -> Rect {
    let (width, height) = CardWidget::size(grid.rows(), grid.cols());
    Rect::new(area.x, area.y, width.min(area.width), height.min(area.height))
}

async fn handle_action(app: &mut App, handle: &SchedulerHandle, action: Action) -> Result<()> {
    match action {
        Action::Quit => app.should_quit = true,
        Action::Play(kind) => {
            let name = kind.to_string();
            if !handle.play(PlayRequest::new(kind)).await? {
                app.set_status(format!("Busy, {} not started (! restarts startup)", name));
            }
        }
        Action::ForceStartup => {
            let request = PlayRequest::new(AnimationKind::Startup).interrupting();
            if !handle.play(request).await? {
                app.set_status("Current animation cannot be interrupted");
            }
        }
        Action::Interrupt => {
            if !handle.interrupt().await? {
                app.set_status("Nothing is playing");
            }
        }
        Action::FasterFps | Action::SlowerFps => {
            let wanted = app.stepped_fps(action == Action::FasterFps);
            app.fps = handle.set_fps(wanted).await?;
        }
        Action::ShowMessage => {
            if handle.display(app.message_card.clone()).await? {
                app.clear_status();
            } else {
                app.set_status("Wait for the animation to finish");
            }
        }
        Action::ToggleHelp => app.show_help = !app.show_help,
        Action::None => {}
    }
    Ok(())
}

/// Truecolor card when the terminal advertises it
fn pick_theme() -> Theme {
    let truecolor = std::env::var("COLORTERM")
        .map(|v| v.contains("truecolor") || v.contains("24bit"))
        .unwrap_or(false);
    if truecolor {
        Theme::default()
    } else {
        Theme::basic()
    }
}
