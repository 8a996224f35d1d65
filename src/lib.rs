// Files to Text - load text files, inspect them, and copy their contents
//
// This is the library crate containing the core logic and data structures.
// The binary crate (main.rs) provides the console front-end, and the Slint
// window when built with the `gui` feature.

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;
#[cfg(feature = "gui")]
pub mod ui;

// Re-export commonly used types for convenience
pub use app::AppController;
pub use config::ConfigManager;
pub use models::{AppState, LoadedFile, Settings, UserConfig};
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// Prefix for rotated log files
pub const LOG_PREFIX: &str = "files-to-text";
