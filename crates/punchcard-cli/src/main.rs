use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use punchcard_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "punchcard")]
#[command(author, version, about = "An IBM 029 punch card display with animated transitions")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the card display (default)
    Run {
        /// Text punched onto the card between animations
        #[arg(short, long, default_value = "HELLO WORLD")]
        message: String,
        /// Custom animation played by the `c` key
        #[arg(long, default_value = "default")]
        custom: String,
    },
    /// Show the Hollerith punches for a piece of text
    Encode {
        text: String,
        /// Card width; extra characters are dropped
        #[arg(short, long, default_value_t = 80)]
        columns: usize,
    },
    /// Read row lists such as `12,1` back into characters
    Decode {
        #[arg(required = true)]
        patterns: Vec<String>,
    },
    /// Print the frames of an animation
    Frames {
        /// startup, sleep, wake or custom:<name>
        kind: String,
        #[arg(long)]
        rows: Option<usize>,
        #[arg(long)]
        columns: Option<usize>,
        /// Stop after this many frames
        #[arg(short, long)]
        limit: Option<usize>,
        /// Card content the sleep fade starts from
        #[arg(short, long, default_value = "HELLO")]
        message: String,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration if none exists
    Init,
}

/// Logs go to stderr, or to the log file while the TUI owns the terminal
fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
    );

    if to_file {
        let log_path = config.log_path();
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&log_path)?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    let tui = matches!(cli.command, Some(Commands::Run { .. }) | None);
    init_logging(&config, tui)?;

    match cli.command {
        Some(Commands::Run { message, custom }) => {
            commands::run::run(config, &message, &custom).await
        }
        None => commands::run::run(config, "HELLO WORLD", "default").await,
        Some(Commands::Encode { text, columns }) => commands::encode::run(&text, columns),
        Some(Commands::Decode { patterns }) => commands::decode::run(&patterns),
        Some(Commands::Frames {
            kind,
            rows,
            columns,
            limit,
            message,
        }) => commands::frames::run(
            &config,
            &kind,
            rows.unwrap_or(config.display.rows),
            columns.unwrap_or(config.display.columns),
            limit,
            &message,
        ),
        Some(Commands::Config { action }) => match action {
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Init => commands::config::init(),
        },
    }
}
