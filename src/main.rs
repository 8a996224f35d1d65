//! Files to Text - load text files, inspect them, and copy their contents
//!
//! Main entry point.
//!
//! # Overview
//!
//! The binary initializes:
//! - Configuration loading ([`ConfigManager`])
//! - Logging infrastructure (file rotation + optional console output)
//! - Tokio async runtime for chunked file reads and clipboard writes
//! - State management ([`StateManager`]) and the [`AppController`]
//!
//! It then runs the console front-end, or the Slint window when built with
//! the `gui` feature and started with `--gui`.
//!
//! # Configuration Files
//!
//! Expected in `Files To Text Data/` (or `--config-dir`):
//! - `Files To Text Config.yaml`: size limit, chunk size, logging options

use anyhow::{Context, Result};
use clap::Parser;
use files_to_text::cli::{self, Cli};
use files_to_text::services::SystemClipboard;
use files_to_text::{APP_NAME, AppController, ConfigManager, LOG_PREFIX, StateManager, VERSION};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<ExitCode> {
    let args = Cli::parse();

    let config_manager = ConfigManager::new(&args.config_dir)?;
    let user_config = config_manager.load_user_config()?;
    let settings = user_config.settings;

    // Held until exit so buffered log lines are flushed
    let _guard = files_to_text::logging::setup_logging(
        &settings.log_dir,
        LOG_PREFIX,
        settings.debug_mode,
        settings.console_logging,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("files-to-text-worker")
        .build()
        .context("Failed to create tokio runtime")?;

    let state_manager = Arc::new(StateManager::new());
    let controller = Arc::new(AppController::new(
        Arc::clone(&state_manager),
        &settings,
        Arc::new(SystemClipboard),
    ));

    #[cfg(feature = "gui")]
    if args.gui {
        let gui = files_to_text::ui::GuiController::new(
            Arc::clone(&controller),
            runtime.handle().clone(),
        )?;

        tracing::info!("GUI controller initialized, launching window");
        let result = gui.run(args.paths.clone());

        runtime.shutdown_timeout(Duration::from_secs(5));
        tracing::info!("Application shutdown complete");

        return result
            .map(|()| ExitCode::SUCCESS)
            .map_err(|e| {
                tracing::error!("GUI error: {}", e);
                anyhow::anyhow!("GUI error: {}", e)
            });
    }

    let exit_code = runtime.block_on(cli::run(&controller, &args))?;

    runtime.shutdown_timeout(Duration::from_secs(5));
    tracing::info!("Application shutdown complete");

    Ok(exit_code)
}
