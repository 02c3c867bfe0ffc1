use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub hardware: HardwareConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Number of punch rows on the card (12 for a real card)
    #[serde(default = "default_rows")]
    pub rows: usize,
    /// Number of card columns
    #[serde(default = "default_columns")]
    pub columns: usize,
    /// Center short messages on the card instead of left-aligning them
    #[serde(default = "default_true")]
    pub center_message: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            columns: default_columns(),
            center_message: default_true(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Playback frame rate, clamped to 1..=60
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Diagonals between the punching edge and the clearing edge of the startup wave
    #[serde(default = "default_startup_trail")]
    pub startup_trail: usize,
    /// Trailing distance of the wake wave
    #[serde(default = "default_wake_trail")]
    pub wake_trail: usize,
    /// Blank frames appended after the startup wave
    #[serde(default = "default_startup_drain")]
    pub startup_drain_steps: usize,
    /// Blank frames in the wake drain phase
    #[serde(default = "default_wake_drain")]
    pub wake_drain_steps: usize,
    /// Play the startup animation as soon as the scheduler starts
    #[serde(default = "default_true")]
    pub auto_play_startup: bool,
    /// Directory holding custom `<name>.json` animations (defaults to data_dir/animations)
    #[serde(default)]
    pub custom_dir: Option<PathBuf>,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            startup_trail: default_startup_trail(),
            wake_trail: default_wake_trail(),
            startup_drain_steps: default_startup_drain(),
            wake_drain_steps: default_wake_drain(),
            auto_play_startup: default_true(),
            custom_dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HardwareConfig {
    /// Try to mirror frames to a physical display
    #[serde(default)]
    pub enabled: bool,
    /// Unix socket of the display bridge (defaults to data_dir/punchcard.sock)
    #[serde(default)]
    pub socket_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("punchcard")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_rows() -> usize {
    12
}

fn default_columns() -> usize {
    80
}

fn default_fps() -> u32 {
    30
}

fn default_startup_trail() -> usize {
    12
}

fn default_wake_trail() -> usize {
    8
}

fn default_startup_drain() -> usize {
    2
}

fn default_wake_drain() -> usize {
    4
}

fn default_tick_rate() -> u64 {
    50
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from file or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML document
    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/punchcard/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("punchcard")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Directory searched for custom animation resources
    pub fn custom_animation_dir(&self) -> PathBuf {
        match &self.animation.custom_dir {
            Some(dir) => expand_tilde(dir),
            None => self.data_dir().join("animations"),
        }
    }

    /// Get the Unix socket path of the hardware bridge
    pub fn hardware_socket_path(&self) -> PathBuf {
        match &self.hardware.socket_path {
            Some(path) => expand_tilde(path),
            None => self.data_dir().join("punchcard.sock"),
        }
    }

    /// Log file used while the terminal UI owns stdout
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("punchcard.log")
    }
}
