#![deny(unreachable_pub)]
pub mod config;
pub mod grid;

pub use crate::config::Settings;
pub use crate::grid::{GridBotEngine, GridConfig, GridError, GridResult};
