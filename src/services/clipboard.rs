use thiserror::Error;

/// Errors from writing to the clipboard
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to write to clipboard: {0}")]
    WriteFailed(String),

    #[error("Nothing to copy: {0}")]
    NothingToCopy(String),
}

/// Destination for copied text.
///
/// Writes may block, so callers run them on the blocking pool.
#[cfg_attr(test, mockall::automock)]
pub trait Clipboard: Send + Sync {
    fn set_text(&self, text: String) -> Result<(), ClipboardError>;
}

/// The system clipboard, via `arboard`.
///
/// A fresh handle is opened per write; `arboard` keeps served contents alive
/// for the rest of the process on platforms that need it.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl Clipboard for SystemClipboard {
    fn set_text(&self, text: String) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;

        let len = text.len();
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::WriteFailed(e.to_string()))?;

        tracing::debug!("Wrote {} bytes to the system clipboard", len);
        Ok(())
    }
}
