use crate::services::ingest::{DEFAULT_MAX_FILE_SIZE, IngestLimits};
use crate::services::reader::{ChunkedReader, DEFAULT_CHUNK_SIZE};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// User configuration from `Files To Text Config.yaml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(rename = "Files_To_Text", default)]
    pub settings: Settings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "Max File Size MB", default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,

    #[serde(rename = "Chunk Size KB", default = "default_chunk_size_kb")]
    pub chunk_size_kb: usize,

    #[serde(rename = "Copied Indicator MS", default = "default_copied_indicator_ms")]
    pub copied_indicator_ms: u64,

    /// Extensions accepted on top of the built-in allow-list
    #[serde(rename = "Extra Extensions", default)]
    pub extra_extensions: Vec<String>,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,

    #[serde(rename = "Console Logging", default = "default_true")]
    pub console_logging: bool,

    #[serde(rename = "Log Directory", default = "default_log_dir")]
    pub log_dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_file_size_mb: default_max_file_size_mb(),
            chunk_size_kb: default_chunk_size_kb(),
            copied_indicator_ms: default_copied_indicator_ms(),
            extra_extensions: Vec::new(),
            debug_mode: false,
            console_logging: true,
            log_dir: default_log_dir(),
        }
    }
}

impl Settings {
    /// Size ceiling and allow-list extras for ingestion
    pub fn ingest_limits(&self) -> IngestLimits {
        IngestLimits {
            max_file_size: self.max_file_size_mb.saturating_mul(1024 * 1024),
            extra_extensions: self.extra_extensions.clone(),
        }
    }

    /// Chunked reader using the configured slice size
    pub fn chunked_reader(&self) -> ChunkedReader {
        ChunkedReader::new(self.chunk_size_kb.saturating_mul(1024))
    }

    /// How long the "Copied!" indicator stays visible
    pub fn copied_indicator(&self) -> Duration {
        Duration::from_millis(self.copied_indicator_ms)
    }
}

fn default_max_file_size_mb() -> u64 {
    DEFAULT_MAX_FILE_SIZE / (1024 * 1024)
}

fn default_chunk_size_kb() -> usize {
    DEFAULT_CHUNK_SIZE / 1024
}

fn default_copied_indicator_ms() -> u64 {
    2000
}

fn default_true() -> bool {
    true
}

fn default_log_dir() -> String {
    "logs".to_string()
}
