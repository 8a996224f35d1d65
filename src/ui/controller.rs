// GUI Controller - Bridges the Slint window with the AppController
//
// It handles:
// - Slint callbacks → AppController actions (sync or spawned on tokio)
// - State change events → view model → Slint properties
// - The native multi-file picker

use crate::app::AppController;
use crate::services::ingest::{ALLOWED_EXTENSIONS, IngestLimits};
use crate::state::StateManager;
use crate::ui::bridge::{EventLoopBridge, EventLoopBridgeHandle};
use crate::ui::view::{FileView, LineView, WindowView};
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use slint::{ModelRc, SharedString, VecModel};
use std::sync::Arc;
use tokio::sync::broadcast;

// Include the generated Slint code
slint::include_modules!();

/// GUI Controller that wires the Slint window to the application controller
///
/// # Example
/// ```ignore
/// let app = Arc::new(AppController::new(state, &settings, Arc::new(SystemClipboard)));
/// let runtime = tokio::runtime::Runtime::new()?;
///
/// let gui = GuiController::new(app, runtime.handle().clone())?;
/// gui.run(startup_paths)?;  // Blocks until window is closed
/// ```
pub struct GuiController {
    /// The Slint UI window
    ui: MainWindow,

    /// Event loop bridge for coordinating between tokio and Slint
    bridge: EventLoopBridge<MainWindow>,

    app: Arc<AppController>,
}

impl GuiController {
    /// Create the window, wire its callbacks and subscribe it to state changes
    pub fn new(app: Arc<AppController>, tokio_handle: tokio::runtime::Handle) -> Result<Self> {
        let ui = MainWindow::new().context("Failed to create Slint UI")?;
        let bridge = EventLoopBridge::new(&ui, tokio_handle);

        apply_view(&ui, WindowView::from_state(&app.snapshot()));
        Self::setup_callbacks(&ui, &bridge, &app);
        Self::setup_state_subscription(&bridge, app.state());

        tracing::info!("GUI controller initialized");

        Ok(Self { ui, bridge, app })
    }

    /// Run the GUI, ingesting `startup_paths` first (blocks until the window is closed)
    pub fn run(self, startup_paths: Vec<Utf8PathBuf>) -> Result<(), slint::PlatformError> {
        if !startup_paths.is_empty() {
            tracing::info!("Loading {} files from the command line", startup_paths.len());
            Self::spawn_ingest(&self.bridge.clone_handle(), &self.app, startup_paths);
        }

        tracing::info!("Starting GUI event loop");
        let result = self.ui.run();

        // Stop a batch still reading once the window is gone
        if self.app.state().read(|s| s.is_loading) {
            self.app.cancel_ingestion();
        }

        result
    }

    fn setup_callbacks(
        ui: &MainWindow,
        bridge: &EventLoopBridge<MainWindow>,
        app: &Arc<AppController>,
    ) {
        let handle = bridge.clone_handle();
        let app_clone = Arc::clone(app);
        ui.on_browse_files(move || {
            tracing::debug!("Browse files clicked");

            match Self::show_file_picker(app_clone.pipeline().limits()) {
                Some(paths) if !paths.is_empty() => {
                    tracing::info!("{} files selected", paths.len());
                    Self::spawn_ingest(&handle, &app_clone, paths);
                }
                _ => tracing::debug!("File picker cancelled"),
            }
        });

        let app_clone = Arc::clone(app);
        let ui_weak = ui.as_weak();
        ui.on_clear_files(move || {
            app_clone.clear();

            // The search box owns its text while typing; only reset it here
            if let Some(ui) = ui_weak.upgrade() {
                ui.set_search_term(SharedString::default());
            }
        });

        let app_clone = Arc::clone(app);
        ui.on_search_changed(move |term| {
            app_clone.set_search_term(term.as_str());
        });

        let handle = bridge.clone_handle();
        let app_clone = Arc::clone(app);
        ui.on_copy_file(move |index| {
            let Ok(index) = usize::try_from(index) else {
                return;
            };
            let app = Arc::clone(&app_clone);
            handle.spawn_async(move || async move {
                // Failures are logged by the controller
                let _ = app.copy_file(index).await;
            });
        });

        let handle = bridge.clone_handle();
        let app_clone = Arc::clone(app);
        ui.on_copy_all(move || {
            let app = Arc::clone(&app_clone);
            handle.spawn_async(move || async move {
                let _ = app.copy_all().await;
            });
        });

        let app_clone = Arc::clone(app);
        ui.on_toggle_expanded(move |index| {
            if let Ok(index) = usize::try_from(index) {
                app_clone.toggle_expanded(index);
            }
        });

        let app_clone = Arc::clone(app);
        ui.on_dismiss_error(move || {
            app_clone.dismiss_error();
        });
    }

    /// Refresh the window whenever the state changes.
    ///
    /// A background thread rebuilds the view model off the UI thread; bursts
    /// of changes are coalesced into one refresh.
    fn setup_state_subscription(
        bridge: &EventLoopBridge<MainWindow>,
        state_manager: &Arc<StateManager>,
    ) {
        let handle = bridge.clone_handle();
        let state = Arc::clone(state_manager);
        let mut rx = state_manager.subscribe();

        std::thread::spawn(move || {
            tracing::debug!("State subscription thread started");

            loop {
                match rx.blocking_recv() {
                    Ok(change) => tracing::trace!("State change received: {:?}", change),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("UI lagged behind by {} state changes", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }

                // Drain whatever else is pending
                loop {
                    match rx.try_recv() {
                        Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                        Err(_) => break,
                    }
                }

                if handle.is_closed() {
                    break;
                }

                let view = WindowView::from_state(&state.snapshot());
                handle.update_ui(move |ui| apply_view(ui, view));
            }

            tracing::debug!("State subscription thread terminated");
        });
    }

    fn spawn_ingest(
        handle: &EventLoopBridgeHandle<MainWindow>,
        app: &Arc<AppController>,
        paths: Vec<Utf8PathBuf>,
    ) {
        let app = Arc::clone(app);
        handle.spawn_async(move || async move {
            // The error is already stored in state and shown in the window
            if let Err(e) = app.ingest_paths(&paths).await {
                tracing::debug!("Batch ended with error: {}", e);
            }
        });
    }

    /// Show a native multi-file picker filtered to the accepted extensions
    ///
    /// # Returns
    /// The selected paths, or None if cancelled
    fn show_file_picker(limits: &IngestLimits) -> Option<Vec<Utf8PathBuf>> {
        use rfd::FileDialog;

        let extensions: Vec<String> = ALLOWED_EXTENSIONS
            .iter()
            .map(|ext| ext.to_string())
            .chain(
                limits
                    .extra_extensions
                    .iter()
                    .map(|ext| ext.trim_start_matches('.').to_lowercase()),
            )
            .collect();

        let paths = FileDialog::new()
            .set_title("Select Text Files")
            .add_filter("Text files", &extensions)
            .add_filter("All files", &["*"])
            .pick_files()?;

        Some(
            paths
                .into_iter()
                .filter_map(|path| {
                    Utf8PathBuf::try_from(path)
                        .inspect_err(|e| tracing::error!("Failed to convert path to UTF-8: {}", e))
                        .ok()
                })
                .collect(),
        )
    }
}

/// Push a view model into the window's properties
fn apply_view(ui: &MainWindow, view: WindowView) {
    ui.set_total_files(view.total_files.into());
    ui.set_total_size(view.total_size.into());
    ui.set_total_lines(view.total_lines.into());
    ui.set_total_characters(view.total_characters.into());
    ui.set_is_loading(view.is_loading);
    ui.set_error_message(view.error_message.into());
    ui.set_all_copied(view.all_copied);
    ui.set_has_files(view.has_files);
    ui.set_filter_summary(view.filter_summary.into());

    let breakdown: Vec<TypeCount> = view
        .type_breakdown
        .into_iter()
        .map(|(label, count)| TypeCount {
            label: label.into(),
            count: to_int(count),
        })
        .collect();
    ui.set_type_breakdown(ModelRc::new(VecModel::from(breakdown)));

    let rows: Vec<FileRow> = view.files.into_iter().map(to_row).collect();
    ui.set_files(ModelRc::new(VecModel::from(rows)));
}

fn to_row(file: FileView) -> FileRow {
    FileRow {
        content: file.expanded_content().into(),
        index: to_int(file.index),
        name: file.file.name.as_str().into(),
        type_label: file.type_label.into(),
        size: file.size.into(),
        modified: file.modified.into(),
        lines: file.lines.into(),
        characters: file.characters.into(),
        expanded: file.expanded,
        copied: file.copied,
        match_count: to_int(file.match_count),
        matches: to_lines(file.matches),
        content_lines: to_lines(file.content_lines),
    }
}

fn to_lines(lines: Vec<LineView>) -> ModelRc<MatchLine> {
    let lines: Vec<MatchLine> = lines
        .into_iter()
        .map(|line| MatchLine {
            line: to_int(line.line_number),
            spans: ModelRc::new(VecModel::from(
                line.spans
                    .into_iter()
                    .map(|span| Span {
                        text: span.text.into(),
                        highlighted: span.highlighted,
                    })
                    .collect::<Vec<_>>(),
            )),
        })
        .collect();
    ModelRc::new(VecModel::from(lines))
}

fn to_int(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
