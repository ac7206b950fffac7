pub mod app;
pub mod config;
pub mod error;
pub mod event;
pub mod keymap;
pub mod ui;

pub use crate::app::{App, InputMode};
pub use crate::config::{default_config_path, load_config, Config};
pub use crate::event::{Event, EventHandler};
