// Laykey Config Module
// TOML keymap configuration: token grammar and file loading

pub mod actions;
pub mod parser;

pub use actions::{parse_action, ActionParseError};
pub use parser::{Config, ConfigError};
