use crate::error::Result;
use linestream_core::timer::{DEFAULT_DURATION_MINUTES, MAX_MINUTES};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Keymap {
    pub quit: String,
    pub help: String,
    pub line_up: String,
    pub line_down: String,
    pub new_line: String,
    pub indent: String,
    pub outdent: String,
    pub focus_or_complete: String,
    pub uncomplete: String,
    pub exit_focus: String,
    pub stash_capture: String,
    pub stash_picker: String,
    pub toggle_timer: String,
    pub reset_timer: String,
    pub edit_timer: String,
    pub toggle_time_view: String,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            quit: "ctrl-q".to_string(),
            help: "f1".to_string(),
            line_up: "up".to_string(),
            line_down: "down".to_string(),
            new_line: "enter".to_string(),
            indent: "tab".to_string(),
            outdent: "shift-tab".to_string(),
            focus_or_complete: "ctrl-f".to_string(),
            uncomplete: "ctrl-u".to_string(),
            exit_focus: "esc".to_string(),
            stash_capture: "ctrl-s".to_string(),
            stash_picker: "ctrl-o".to_string(),
            toggle_timer: "alt-t".to_string(),
            reset_timer: "alt-r".to_string(),
            edit_timer: "alt-m".to_string(),
            toggle_time_view: "alt-v".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TimerConfig {
    /// Focus duration in minutes
    pub minutes: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            minutes: DEFAULT_DURATION_MINUTES,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub tick_rate_ms: u64,
    pub show_time_spent: bool,
    pub timer: TimerConfig,
    pub keymap: Keymap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate_ms: 250,
            show_time_spent: false,
            timer: TimerConfig::default(),
            keymap: Keymap::default(),
        }
    }
}

impl Config {
    /// Timer minutes clamped to what the timer can display
    pub fn timer_minutes(&self) -> u32 {
        self.timer.minutes.min(MAX_MINUTES)
    }
}

/// `<config dir>/linestream/config.toml`, or `./config.toml` without a config dir
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("linestream").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// Load the config file, writing the defaults first if it does not exist
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        let config = Config::default();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string(&config)?)?;
        info!("wrote default config to {}", path.display());
        return Ok(config);
    }

    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    if config.timer.minutes > MAX_MINUTES {
        warn!(
            "timer.minutes = {} in {} is above {}; using {}",
            config.timer.minutes,
            path.display(),
            MAX_MINUTES,
            config.timer_minutes()
        );
    }
    Ok(config)
}
