//! Services module - Pure logic for loading, measuring, searching and exporting files.
//!
//! The services are **framework-agnostic**: none of them touch the UI or the
//! application state, so front-ends and tests drive them directly.
//!
//! # Components
//!
//! - [`file_type`]: Static extension → type label table ("Rust", "Markdown", ...)
//! - [`format`]: Byte sizes, timestamps, line and character counting
//! - [`reader`]: [`ChunkedReader`] and the [`FileSource`] handles it reads from
//!   ([`DiskFile`], [`MemoryFile`])
//! - [`ingest`]: Batch validation (size ceiling, type allow-list) and the
//!   sequential [`IngestionPipeline`]
//! - [`stats`]: [`Stats`] rollups over the loaded files
//! - [`search`]: [`SearchQuery`] filtering and highlight segmentation
//! - [`export`]: The "copy all" text template
//! - [`clipboard`]: [`Clipboard`] seam and the `arboard`-backed [`SystemClipboard`]
//!
//! # Usage Example
//!
//! ```ignore
//! use files_to_text::services::{ChunkedReader, IngestionPipeline, IngestLimits, MemoryFile};
//!
//! let pipeline = IngestionPipeline::new(ChunkedReader::default(), IngestLimits::default());
//! let files = vec![MemoryFile::new("a.txt", "hello\nworld", 0)];
//!
//! let mut loaded = Vec::new();
//! pipeline.ingest(&files, |file| loaded.push(file), None).await?;
//! ```

pub mod clipboard;
pub mod export;
pub mod file_type;
pub mod format;
pub mod ingest;
pub mod reader;
pub mod search;
pub mod stats;

pub use clipboard::{Clipboard, ClipboardError, SystemClipboard};
pub use file_type::{DEFAULT_FILE_TYPE, file_type};
pub use format::{
    count_chars, count_lines, format_bytes, format_count, format_date, split_lines,
};
pub use ingest::{IngestError, IngestLimits, IngestionPipeline, ValidationError};
pub use reader::{ChunkedReader, DiskFile, FileSource, MemoryFile, ReadError};
pub use search::{MatchLine, SearchQuery, Segment, filter_files, highlight};
pub use stats::Stats;
