use crate::models::LoadedFile;
use crate::services::file_type::extension_of;
use crate::services::reader::{ChunkedReader, FileSource, ReadError};
use thiserror::Error;
use tokio::sync::watch;

/// Default per-file size ceiling (25 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 25 * 1024 * 1024;

/// Extensions accepted regardless of the declared media type
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "txt", "md", "csv", "json", "jsonl", "yaml", "yml", "xml", "js", "ts", "py", "java", "c",
    "cpp", "go", "rb", "php", "html", "css", "rs",
];

/// Declared media types accepted regardless of the extension
pub const ALLOWED_MEDIA_TYPES: &[&str] = &[
    "text/plain",
    "text/markdown",
    "text/csv",
    "application/json",
    "text/yaml",
    "text/xml",
    "text/javascript",
    "text/typescript",
    "text/x-python",
    "text/x-java",
    "text/x-c",
    "text/x-c++",
    "text/x-go",
    "text/x-ruby",
    "text/x-php",
    "text/html",
    "text/css",
];

/// Reasons a whole batch is rejected before anything is read
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File \"{name}\" is too large. Maximum size is {limit_mb}MB.")]
    TooLarge { name: String, size: u64, limit_mb: u64 },

    #[error("File \"{0}\" is not a supported text file.")]
    UnsupportedType(String),
}

/// Errors from ingesting a batch
#[derive(Error, Debug)]
pub enum IngestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A read failed; `loaded` files were appended before the failure.
    #[error("{source} ({loaded} of {total} files loaded)")]
    Read {
        #[source]
        source: ReadError,
        loaded: usize,
        total: usize,
    },

    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Another batch is still loading")]
    Busy,
}

/// Size and type limits applied to every batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestLimits {
    pub max_file_size: u64,
    pub extra_extensions: Vec<String>,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            extra_extensions: Vec::new(),
        }
    }
}

impl IngestLimits {
    /// Check whether a file name or declared media type is allow-listed
    pub fn is_supported(&self, name: &str, media_type: Option<&str>) -> bool {
        if media_type.is_some_and(|mt| ALLOWED_MEDIA_TYPES.contains(&mt)) {
            return true;
        }

        extension_of(name).is_some_and(|ext| {
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
                || self
                    .extra_extensions
                    .iter()
                    .any(|extra| extra.trim_start_matches('.').eq_ignore_ascii_case(&ext))
        })
    }

    /// Validate every file in the batch, stopping at the first offender
    pub fn validate<S: FileSource>(&self, files: &[S]) -> Result<(), ValidationError> {
        for file in files {
            if file.size() > self.max_file_size {
                return Err(ValidationError::TooLarge {
                    name: file.name().to_string(),
                    size: file.size(),
                    limit_mb: self.max_file_size / (1024 * 1024),
                });
            }

            if !self.is_supported(file.name(), file.media_type()) {
                return Err(ValidationError::UnsupportedType(file.name().to_string()));
            }
        }

        Ok(())
    }
}

/// Validates a batch and reads each file sequentially through a [`ChunkedReader`].
#[derive(Debug, Clone, Default)]
pub struct IngestionPipeline {
    reader: ChunkedReader,
    limits: IngestLimits,
}

impl IngestionPipeline {
    pub fn new(reader: ChunkedReader, limits: IngestLimits) -> Self {
        Self { reader, limits }
    }

    pub fn limits(&self) -> &IngestLimits {
        &self.limits
    }

    /// Ingest a batch, handing each loaded file to `on_loaded` in input order.
    ///
    /// Validation runs over the whole batch first; on failure nothing is read.
    /// Each file is fully read before the next one starts. A read failure stops
    /// the batch, and files already handed to `on_loaded` stay delivered.
    ///
    /// # Returns
    /// The number of files loaded
    pub async fn ingest<S, F>(
        &self,
        files: &[S],
        mut on_loaded: F,
        cancel: Option<&watch::Receiver<bool>>,
    ) -> Result<usize, IngestError>
    where
        S: FileSource,
        F: FnMut(LoadedFile),
    {
        self.limits.validate(files).inspect_err(|e| {
            tracing::warn!("Batch of {} files rejected: {}", files.len(), e);
        })?;

        tracing::info!("Ingesting batch of {} files", files.len());

        for (loaded, file) in files.iter().enumerate() {
            let content = self
                .reader
                .read_to_string(file, cancel)
                .await
                .map_err(|source| IngestError::Read {
                    source,
                    loaded,
                    total: files.len(),
                })?;

            tracing::debug!("Loaded {} ({} bytes)", file.name(), file.size());

            on_loaded(LoadedFile::new(
                file.name(),
                content,
                file.size(),
                file.last_modified(),
            ));
        }

        Ok(files.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::reader::MemoryFile;

    #[test]
    fn test_allow_list_by_extension() {
        let limits = IngestLimits::default();
        assert!(limits.is_supported("main.rs", None));
        assert!(limits.is_supported("DATA.JSONL", None));
        assert!(limits.is_supported("config.yml", None));
        assert!(!limits.is_supported("image.png", None));
        assert!(!limits.is_supported("Makefile", None));
    }

    #[test]
    fn test_allow_list_by_media_type() {
        let limits = IngestLimits::default();
        assert!(limits.is_supported("Makefile", Some("text/plain")));
        assert!(!limits.is_supported("Makefile", Some("application/octet-stream")));
    }

    #[test]
    fn test_extra_extensions() {
        let limits = IngestLimits {
            extra_extensions: vec![".toml".to_string(), "LOG".to_string()],
            ..IngestLimits::default()
        };
        assert!(limits.is_supported("Cargo.toml", None));
        assert!(limits.is_supported("app.log", None));
        assert!(!limits.is_supported("app.bin", None));
    }

    #[test]
    fn test_validate_too_large() {
        let limits = IngestLimits {
            max_file_size: 4,
            ..IngestLimits::default()
        };
        let files = vec![MemoryFile::new("big.txt", "12345", 0)];

        let err = limits.validate(&files).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { size: 5, .. }));
    }

    #[test]
    fn test_validation_messages() {
        let too_large = ValidationError::TooLarge {
            name: "big.txt".to_string(),
            size: 30 * 1024 * 1024,
            limit_mb: 25,
        };
        assert_eq!(
            too_large.to_string(),
            "File \"big.txt\" is too large. Maximum size is 25MB."
        );

        let unsupported = ValidationError::UnsupportedType("photo.png".to_string());
        assert_eq!(
            unsupported.to_string(),
            "File \"photo.png\" is not a supported text file."
        );
    }

    #[tokio::test]
    async fn test_ingest_preserves_order() {
        let pipeline = IngestionPipeline::new(ChunkedReader::new(3), IngestLimits::default());
        let files = vec![
            MemoryFile::new("b.txt", "second file", 2),
            MemoryFile::new("a.txt", "first", 1),
        ];

        let mut loaded = Vec::new();
        let count = pipeline
            .ingest(&files, |file| loaded.push(file), None)
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(loaded[0].name, "b.txt");
        assert_eq!(loaded[0].content, "second file");
        assert_eq!(loaded[1].name, "a.txt");
        assert_eq!(loaded[1].last_modified, 1);
    }

    #[tokio::test]
    async fn test_invalid_batch_reads_nothing() {
        let pipeline = IngestionPipeline::default();
        let files = vec![
            MemoryFile::new("ok.txt", "fine", 0),
            MemoryFile::new("photo.png", "not text", 0),
        ];

        let mut loaded = Vec::new();
        let result = pipeline.ingest(&files, |file| loaded.push(file), None).await;

        assert!(matches!(
            result,
            Err(IngestError::Validation(ValidationError::UnsupportedType(_)))
        ));
        assert!(loaded.is_empty());
    }
}
