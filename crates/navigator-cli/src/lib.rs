//! navigator-cli library: the native host behind the `note-navigator` binary.
//!
//! Exposed as a library so integration tests can drive real vault
//! directories through the same host types the binary uses.

pub mod config;
pub mod native_vault;
pub mod terminal;

pub use config::{load_settings, Config, ConfigError};
pub use native_vault::NativeVault;
pub use terminal::{statistics_report, Input, TerminalWorkspace};
