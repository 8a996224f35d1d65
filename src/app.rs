// App controller - the single owner of application state and user actions
//
// Front-ends (console, GUI) hold an Arc<AppController> and call its actions;
// they read state back through the StateManager and its change events.

use crate::models::{AppState, CopyTarget, LoadedFile, Settings};
use crate::services::clipboard::{Clipboard, ClipboardError};
use crate::services::export::render_all;
use crate::services::ingest::{IngestError, IngestionPipeline};
use crate::services::reader::{DiskFile, FileSource};
use crate::services::stats::Stats;
use crate::state::StateManager;
use camino::Utf8PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Top-level controller wiring the ingestion pipeline, the clipboard and the
/// application state together.
///
/// # Example
/// ```ignore
/// let controller = AppController::new(
///     Arc::new(StateManager::new()),
///     &Settings::default(),
///     Arc::new(SystemClipboard),
/// );
/// controller.ingest_paths(&paths).await?;
/// controller.copy_all().await?;
/// ```
pub struct AppController {
    state: Arc<StateManager>,
    pipeline: IngestionPipeline,
    clipboard: Arc<dyn Clipboard>,
    copied_indicator: Duration,

    /// Send `true` to cancel the batch in flight
    cancel_tx: watch::Sender<bool>,
}

impl AppController {
    /// Create a controller configured from user settings
    pub fn new(
        state: Arc<StateManager>,
        settings: &Settings,
        clipboard: Arc<dyn Clipboard>,
    ) -> Self {
        let pipeline = IngestionPipeline::new(settings.chunked_reader(), settings.ingest_limits());
        Self::with_pipeline(state, pipeline, clipboard, settings.copied_indicator())
    }

    pub fn with_pipeline(
        state: Arc<StateManager>,
        pipeline: IngestionPipeline,
        clipboard: Arc<dyn Clipboard>,
        copied_indicator: Duration,
    ) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            state,
            pipeline,
            clipboard,
            copied_indicator,
            cancel_tx,
        }
    }

    pub fn state(&self) -> &Arc<StateManager> {
        &self.state
    }

    pub fn pipeline(&self) -> &IngestionPipeline {
        &self.pipeline
    }

    pub fn snapshot(&self) -> AppState {
        self.state.snapshot()
    }

    // ===== Ingestion =====

    /// Ingest a batch of file handles.
    ///
    /// Refuses with [`IngestError::Busy`] while another batch is loading. The
    /// loading flag is set for the whole batch; validation and read errors are
    /// stored as the user-visible error message.
    pub async fn ingest<S: FileSource>(&self, files: &[S]) -> Result<usize, IngestError> {
        if !self.state.begin_loading() {
            tracing::warn!("Ignoring batch of {} files: a batch is already loading", files.len());
            return Err(IngestError::Busy);
        }

        self.cancel_tx.send_replace(false);
        let cancel_rx = self.cancel_tx.subscribe();
        let state = &self.state;

        let result = self
            .pipeline
            .ingest(
                files,
                |file| {
                    state.append_file(file);
                },
                Some(&cancel_rx),
            )
            .await;

        match &result {
            Ok(count) => {
                tracing::info!("Batch complete: {} files loaded", count);
                state.finish_loading(None);
            }
            Err(e @ IngestError::Read { .. }) => {
                tracing::error!("Error processing files: {}", e);
                state.finish_loading(Some(e.to_string()));
            }
            Err(e) => {
                state.finish_loading(Some(e.to_string()));
            }
        }

        result
    }

    /// Open files from disk and ingest them as one batch
    pub async fn ingest_paths(&self, paths: &[Utf8PathBuf]) -> Result<usize, IngestError> {
        let mut files = Vec::with_capacity(paths.len());

        for path in paths {
            match DiskFile::open(path).await {
                Ok(file) => files.push(file),
                Err(source) => {
                    let err = IngestError::Open {
                        path: path.to_string(),
                        source,
                    };
                    tracing::error!("{}", err);
                    self.state.set_error(Some(err.to_string()));
                    return Err(err);
                }
            }
        }

        self.ingest(&files).await
    }

    /// Cancel the batch in flight, if any
    pub fn cancel_ingestion(&self) {
        tracing::info!("Ingestion cancellation requested");
        self.cancel_tx.send_replace(true);
    }

    // ===== View state =====

    /// Remove all files and reset the search term
    pub fn clear(&self) {
        tracing::info!("Clearing all files");
        self.state.clear_files();
    }

    pub fn set_search_term(&self, term: impl Into<String>) {
        self.state.set_search_term(term);
    }

    pub fn toggle_expanded(&self, index: usize) -> Option<bool> {
        self.state.toggle_expanded(index)
    }

    pub fn dismiss_error(&self) {
        self.state.set_error(None);
    }

    pub fn stats(&self) -> Stats {
        self.state.read(AppState::stats)
    }

    /// Files matching the search term, with their collection indices
    pub fn visible_files(&self) -> Vec<(usize, Arc<LoadedFile>)> {
        self.state.read(AppState::visible_files)
    }

    // ===== Clipboard =====

    /// Copy one file's raw content
    pub async fn copy_file(&self, index: usize) -> Result<(), ClipboardError> {
        let content = self
            .state
            .read(|s| s.files.get(index).map(|file| file.content.clone()))
            .ok_or_else(|| ClipboardError::NothingToCopy(format!("no file at index {}", index)))?;

        self.write_clipboard(content, CopyTarget::File(index)).await
    }

    /// Copy every loaded file using the export template
    pub async fn copy_all(&self) -> Result<(), ClipboardError> {
        let text = self.state.read(|s| {
            if s.files.is_empty() {
                None
            } else {
                Some(render_all(&s.files))
            }
        });
        let text = text.ok_or_else(|| ClipboardError::NothingToCopy("no files loaded".to_string()))?;

        self.write_clipboard(text, CopyTarget::All).await
    }

    async fn write_clipboard(&self, text: String, target: CopyTarget) -> Result<(), ClipboardError> {
        let clipboard = Arc::clone(&self.clipboard);
        let len = text.len();

        let result = tokio::task::spawn_blocking(move || clipboard.set_text(text))
            .await
            .unwrap_or_else(|e| Err(ClipboardError::WriteFailed(e.to_string())));

        if let Err(e) = &result {
            tracing::error!("Failed to copy {:?}: {}", target, e);
            return result;
        }

        tracing::info!("Copied {:?} ({} bytes)", target, len);
        let generation = self.state.set_copied(target);

        let state = Arc::clone(&self.state);
        let delay = self.copied_indicator;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            state.clear_copied(generation);
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clipboard::MockClipboard;
    use crate::services::reader::MemoryFile;
    use crate::state::StateChange;

    fn controller_with(clipboard: MockClipboard) -> AppController {
        controller_with_indicator(clipboard, 20)
    }

    fn controller_with_indicator(clipboard: MockClipboard, indicator_ms: u64) -> AppController {
        let settings = Settings {
            copied_indicator_ms: indicator_ms,
            ..Settings::default()
        };
        AppController::new(Arc::new(StateManager::new()), &settings, Arc::new(clipboard))
    }

    #[tokio::test]
    async fn test_ingest_appends_and_toggles_loading() {
        let controller = controller_with(MockClipboard::new());
        let mut rx = controller.state().subscribe();

        let files = vec![MemoryFile::new("a.txt", "hello\nworld", 0)];
        assert_eq!(controller.ingest(&files).await.unwrap(), 1);

        assert_eq!(
            rx.try_recv().unwrap(),
            StateChange::LoadingChanged { is_loading: true }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            StateChange::FilesAppended { added: 1, total: 1 }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            StateChange::LoadingChanged { is_loading: false }
        );

        let state = controller.snapshot();
        assert!(!state.is_loading);
        assert_eq!(state.files.get(0).unwrap().content, "hello\nworld");
    }

    #[tokio::test]
    async fn test_busy_while_loading() {
        let controller = controller_with(MockClipboard::new());
        controller.state().begin_loading();

        let files = vec![MemoryFile::new("a.txt", "x", 0)];
        assert!(matches!(controller.ingest(&files).await, Err(IngestError::Busy)));
        assert!(controller.snapshot().files.is_empty());
    }

    #[tokio::test]
    async fn test_copy_file_sets_and_clears_indicator() {
        let mut clipboard = MockClipboard::new();
        clipboard
            .expect_set_text()
            .withf(|text| text == "fn main(){}")
            .times(1)
            .returning(|_| Ok(()));
        let controller = controller_with(clipboard);

        controller
            .ingest(&[MemoryFile::new("x.rs", "fn main(){}", 0)])
            .await
            .unwrap();
        controller.copy_file(0).await.unwrap();
        assert_eq!(controller.snapshot().copied, Some(CopyTarget::File(0)));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(controller.snapshot().copied, None);
    }

    #[tokio::test]
    async fn test_recopy_restarts_indicator() {
        let mut clipboard = MockClipboard::new();
        clipboard.expect_set_text().times(2).returning(|_| Ok(()));
        let controller = controller_with_indicator(clipboard, 300);

        controller
            .ingest(&[MemoryFile::new("a.txt", "x", 0)])
            .await
            .unwrap();

        controller.copy_file(0).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        controller.copy_file(0).await.unwrap();

        // The first timer has fired by now; the second copy still shows
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(controller.snapshot().copied, Some(CopyTarget::File(0)));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(controller.snapshot().copied, None);
    }

    #[tokio::test]
    async fn test_clipboard_failure_leaves_indicator_unset() {
        let mut clipboard = MockClipboard::new();
        clipboard
            .expect_set_text()
            .returning(|_| Err(ClipboardError::Unavailable("no display".to_string())));
        let controller = controller_with(clipboard);

        controller
            .ingest(&[MemoryFile::new("a.txt", "x", 0)])
            .await
            .unwrap();

        assert!(controller.copy_all().await.is_err());
        assert_eq!(controller.snapshot().copied, None);
    }

    #[tokio::test]
    async fn test_copy_without_files() {
        let controller = controller_with(MockClipboard::new());
        assert!(matches!(
            controller.copy_all().await,
            Err(ClipboardError::NothingToCopy(_))
        ));
        assert!(matches!(
            controller.copy_file(3).await,
            Err(ClipboardError::NothingToCopy(_))
        ));
    }
}
