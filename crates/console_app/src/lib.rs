//! Headless stream console: wires the pure core, the IO engine and logging
//! into a command-line tool.
pub mod app;
pub mod cli;
pub mod config;
pub mod effects;
pub mod render;

pub use app::{CommandError, Console};
pub use cli::{AddArgs, Cli, Command};
pub use config::{ConfigError, ConsoleConfig, DEFAULT_CONFIG_FILE};
pub use effects::{event_to_msg, EffectRunner};
