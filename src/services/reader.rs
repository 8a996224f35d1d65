use camino::{Utf8Path, Utf8PathBuf};
use std::future::Future;
use std::io::{self, SeekFrom};
use std::time::UNIX_EPOCH;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::sync::{Mutex, watch};

/// Default slice size for chunked reads (64 KiB)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// A file handle with metadata and a byte-range-readable body.
///
/// Implemented by [`DiskFile`] for real files and [`MemoryFile`] for in-memory
/// content (tests, pasted text).
pub trait FileSource: Send + Sync {
    /// Display name (not guaranteed unique)
    fn name(&self) -> &str;

    /// Size of the body in bytes
    fn size(&self) -> u64;

    /// Last-modified time in epoch milliseconds
    fn last_modified(&self) -> i64;

    /// Declared media type, if the source carries one
    fn media_type(&self) -> Option<&str>;

    /// Read up to `len` bytes starting at `offset`.
    ///
    /// Returns fewer bytes only at the end of the body.
    fn read_range(&self, offset: u64, len: usize)
    -> impl Future<Output = io::Result<Vec<u8>>> + Send;
}

/// Errors that abort a chunked read
#[derive(Error, Debug)]
pub enum ReadError {
    #[error("Error reading file {name} at offset {offset}: {source}")]
    Io {
        name: String,
        offset: u64,
        #[source]
        source: io::Error,
    },

    #[error("File {name} ended at offset {offset}, expected {expected} bytes")]
    Truncated {
        name: String,
        offset: u64,
        expected: u64,
    },

    #[error("Reading {0} was cancelled")]
    Cancelled(String),
}

/// Reads a whole [`FileSource`] as text in fixed-size sequential slices.
///
/// UTF-8 sequences split across a slice boundary are carried over to the next
/// slice, so the concatenated text is identical to decoding the file at once.
/// Invalid sequences decode to U+FFFD and a leading BOM is dropped.
#[derive(Debug, Clone, Copy)]
pub struct ChunkedReader {
    chunk_size: usize,
}

impl ChunkedReader {
    /// Create a reader with the given slice size (clamped to at least 1 byte)
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Read the full text of `source`.
    ///
    /// Each slice read is a suspension point. When `cancel` is given, it is
    /// checked before every slice and a `true` value aborts with
    /// [`ReadError::Cancelled`]. Any failure discards what was read so far.
    pub async fn read_to_string<S: FileSource>(
        &self,
        source: &S,
        cancel: Option<&watch::Receiver<bool>>,
    ) -> Result<String, ReadError> {
        let size = source.size();
        let mut decoder = Utf8Accumulator::new(size as usize);
        let mut offset = 0u64;

        while offset < size {
            if cancel.is_some_and(|rx| *rx.borrow()) {
                tracing::info!("Read of {} cancelled at offset {}", source.name(), offset);
                return Err(ReadError::Cancelled(source.name().to_string()));
            }

            let bytes = source
                .read_range(offset, self.chunk_size)
                .await
                .map_err(|e| ReadError::Io {
                    name: source.name().to_string(),
                    offset,
                    source: e,
                })?;

            if bytes.is_empty() {
                return Err(ReadError::Truncated {
                    name: source.name().to_string(),
                    offset,
                    expected: size,
                });
            }

            decoder.push(&bytes);
            offset += self.chunk_size as u64;

            tracing::trace!(
                "Read chunk of {} ({} bytes, offset now {})",
                source.name(),
                bytes.len(),
                offset
            );
        }

        Ok(decoder.finish())
    }
}

impl Default for ChunkedReader {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

/// Incremental UTF-8 decoder that holds back incomplete trailing sequences.
struct Utf8Accumulator {
    text: String,
    pending: Vec<u8>,
    at_start: bool,
}

impl Utf8Accumulator {
    fn new(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            pending: Vec::new(),
            at_start: true,
        }
    }

    fn push(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);

        if self.at_start {
            // Wait until we can tell whether the file starts with a BOM
            if self.pending.len() < UTF8_BOM.len() && UTF8_BOM.starts_with(&self.pending) {
                return;
            }
            if self.pending.starts_with(UTF8_BOM) {
                self.pending.drain(..UTF8_BOM.len());
            }
            self.at_start = false;
        }

        let mut consumed = 0;
        loop {
            match std::str::from_utf8(&self.pending[consumed..]) {
                Ok(valid) => {
                    self.text.push_str(valid);
                    consumed = self.pending.len();
                    break;
                }
                Err(e) => {
                    let valid_end = consumed + e.valid_up_to();
                    self.text
                        .push_str(&String::from_utf8_lossy(&self.pending[consumed..valid_end]));
                    consumed = valid_end;

                    match e.error_len() {
                        Some(invalid_len) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            consumed += invalid_len;
                        }
                        // Incomplete sequence at the end: keep it for the next slice
                        None => break,
                    }
                }
            }
        }

        self.pending.drain(..consumed);
    }

    fn finish(mut self) -> String {
        if self.at_start && self.pending.as_slice() == UTF8_BOM {
            self.pending.clear();
        }
        if !self.pending.is_empty() {
            self.text.push_str(&String::from_utf8_lossy(&self.pending));
        }
        self.text
    }
}

/// A file on disk, read through `tokio::fs`.
///
/// The handle is opened on the first read and reused for every later slice,
/// so all slices come from the same file even if the path is replaced.
#[derive(Debug)]
pub struct DiskFile {
    path: Utf8PathBuf,
    name: String,
    size: u64,
    last_modified: i64,
    handle: Mutex<Option<File>>,
}

impl DiskFile {
    /// Stat a file and capture its metadata
    pub async fn open<P: AsRef<Utf8Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let metadata = tokio::fs::metadata(&path).await?;

        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path),
            ));
        }

        let last_modified = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|elapsed| elapsed.as_millis() as i64)
            .unwrap_or_default();

        Ok(Self {
            name: path.file_name().unwrap_or(path.as_str()).to_string(),
            size: metadata.len(),
            last_modified,
            path,
            handle: Mutex::new(None),
        })
    }
}

impl FileSource for DiskFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn last_modified(&self) -> i64 {
        self.last_modified
    }

    fn media_type(&self) -> Option<&str> {
        None
    }

    async fn read_range(&self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        let mut slot = self.handle.lock().await;

        // A failed slice drops the handle; the next read reopens
        let mut file = match slot.take() {
            Some(file) => file,
            None => {
                tracing::debug!("Opening {} for reading", self.path);
                File::open(&self.path).await?
            }
        };

        file.seek(SeekFrom::Start(offset)).await?;

        let mut buffer = Vec::with_capacity(len);
        (&mut file).take(len as u64).read_to_end(&mut buffer).await?;

        *slot = Some(file);
        Ok(buffer)
    }
}

/// An in-memory file body.
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    bytes: Vec<u8>,
    last_modified: i64,
    media_type: Option<String>,
}

impl MemoryFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>, last_modified: i64) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            last_modified,
            media_type: None,
        }
    }

    /// Attach a declared media type such as `text/plain`
    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }
}

impl FileSource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn last_modified(&self) -> i64 {
        self.last_modified
    }

    fn media_type(&self) -> Option<&str> {
        self.media_type.as_deref()
    }

    async fn read_range(&self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        let start = (offset as usize).min(self.bytes.len());
        let end = start.saturating_add(len).min(self.bytes.len());
        Ok(self.bytes[start..end].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Source that fails on the n-th slice read
    struct FailingFile {
        inner: MemoryFile,
        fail_on: usize,
        reads: Arc<AtomicUsize>,
    }

    impl FileSource for FailingFile {
        fn name(&self) -> &str {
            self.inner.name()
        }

        fn size(&self) -> u64 {
            self.inner.size()
        }

        fn last_modified(&self) -> i64 {
            0
        }

        fn media_type(&self) -> Option<&str> {
            None
        }

        async fn read_range(&self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
            let n = self.reads.fetch_add(1, Ordering::SeqCst);
            if n == self.fail_on {
                return Err(io::Error::other("disk went away"));
            }
            self.inner.read_range(offset, len).await
        }
    }

    fn read(reader: ChunkedReader, file: &MemoryFile) -> String {
        tokio_test::block_on(reader.read_to_string(file, None)).unwrap()
    }

    #[test]
    fn test_smaller_than_one_chunk() {
        let file = MemoryFile::new("a.txt", "hello\nworld", 0);
        assert_eq!(read(ChunkedReader::default(), &file), "hello\nworld");
    }

    #[test]
    fn test_exact_multiple_of_chunk() {
        let content = "abcd".repeat(8);
        let file = MemoryFile::new("a.txt", content.clone(), 0);
        assert_eq!(read(ChunkedReader::new(8), &file), content);
    }

    #[test]
    fn test_not_a_multiple_of_chunk() {
        let content = "abcdefghij".repeat(7);
        let file = MemoryFile::new("a.txt", content.clone(), 0);
        assert_eq!(read(ChunkedReader::new(16), &file), content);
    }

    #[test]
    fn test_empty_file_resolves() {
        let file = MemoryFile::new("empty.txt", Vec::new(), 0);
        assert_eq!(read(ChunkedReader::default(), &file), "");
    }

    #[test]
    fn test_multibyte_split_across_chunks() {
        let content = "héllo wörld — ünïcödé ✓ 🦀";
        let file = MemoryFile::new("u.txt", content, 0);
        for chunk_size in 1..=7 {
            assert_eq!(read(ChunkedReader::new(chunk_size), &file), content);
        }
    }

    #[test]
    fn test_bom_is_dropped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"text");
        let file = MemoryFile::new("bom.txt", bytes, 0);
        assert_eq!(read(ChunkedReader::new(1), &file), "text");
        assert_eq!(read(ChunkedReader::default(), &file), "text");
    }

    #[test]
    fn test_invalid_bytes_become_replacement() {
        let file = MemoryFile::new("bad.txt", vec![b'a', 0xFF, b'b'], 0);
        assert_eq!(read(ChunkedReader::new(2), &file), "a\u{FFFD}b");
    }

    #[test]
    fn test_truncated_sequence_at_end() {
        let file = MemoryFile::new("cut.txt", vec![b'a', 0xE2, 0x82], 0);
        assert_eq!(read(ChunkedReader::new(2), &file), "a\u{FFFD}");
    }

    #[test]
    fn test_read_failure_aborts() {
        let file = FailingFile {
            inner: MemoryFile::new("f.txt", "x".repeat(100), 0),
            fail_on: 2,
            reads: Arc::new(AtomicUsize::new(0)),
        };

        let result = tokio_test::block_on(ChunkedReader::new(10).read_to_string(&file, None));
        match result {
            Err(ReadError::Io { offset, .. }) => assert_eq!(offset, 20),
            other => panic!("expected Io error, got {:?}", other),
        }
        assert_eq!(file.reads.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_cancelled_before_first_chunk() {
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let file = MemoryFile::new("a.txt", "content", 0);
        let result = tokio_test::block_on(ChunkedReader::default().read_to_string(&file, Some(&rx)));
        assert!(matches!(result, Err(ReadError::Cancelled(_))));
    }

    #[tokio::test]
    async fn test_disk_file_round_trip() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("notes.md")).unwrap();
        let content = "# Title\n".repeat(5000);
        std::fs::write(&path, &content).unwrap();

        let file = DiskFile::open(&path).await.unwrap();
        assert_eq!(file.name(), "notes.md");
        assert_eq!(file.size(), content.len() as u64);
        assert!(file.last_modified() > 0);

        let text = ChunkedReader::new(4096).read_to_string(&file, None).await.unwrap();
        assert_eq!(text, content);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_disk_file_keeps_reading_the_opened_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let path = dir.join("log.txt");
        std::fs::write(&path, "aaaabbbb").unwrap();

        let file = DiskFile::open(&path).await.unwrap();
        assert_eq!(file.read_range(0, 4).await.unwrap(), b"aaaa");

        // Swap a different file in under the same name
        let replacement = dir.join("log.txt.new");
        std::fs::write(&replacement, "zzzzyyyy").unwrap();
        std::fs::rename(&replacement, &path).unwrap();

        assert_eq!(file.read_range(4, 4).await.unwrap(), b"bbbb");
        assert_eq!(file.read_range(8, 4).await.unwrap(), b"");
    }

    #[tokio::test]
    async fn test_disk_file_rejects_directories() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        assert!(DiskFile::open(&path).await.is_err());
    }
}
