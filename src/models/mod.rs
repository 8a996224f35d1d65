//! Data models for the Files to Text application.
//!
//! - [`LoadedFile`]: One ingested file (name, decoded content, size, timestamp)
//! - [`FileCollection`]: Insertion-ordered, append-or-clear collection of loaded files
//! - [`AppState`]: The central state container (files, search term, loading flag, UI flags)
//! - [`UserConfig`] / [`Settings`]: User preferences loaded from `Files To Text Config.yaml`
//!
//! # Architecture Note
//!
//! `AppState` is owned by [`StateManager`](crate::state::StateManager) behind
//! `Arc<RwLock<>>`. Loaded files are immutable and shared through `Arc`, so
//! cloning the state for change detection or snapshots never copies file content.

pub mod app_state;
pub mod config;
pub mod loaded_file;

pub use app_state::{AppState, CopyTarget};
pub use config::{Settings, UserConfig};
pub use loaded_file::{FileCollection, LoadedFile};
