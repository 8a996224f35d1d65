use crate::services::file_type::file_type;
use crate::services::format::{count_chars, count_lines};
use std::sync::Arc;

/// One ingested file. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    /// File name as reported by the source (not guaranteed unique)
    pub name: String,

    /// Decoded text content
    pub content: String,

    /// Size of the source in bytes
    pub size: u64,

    /// Last-modified time in epoch milliseconds
    pub last_modified: i64,
}

impl LoadedFile {
    pub fn new(name: impl Into<String>, content: String, size: u64, last_modified: i64) -> Self {
        Self {
            name: name.into(),
            content,
            size,
            last_modified,
        }
    }

    /// Human-readable type label derived from the name
    pub fn file_type(&self) -> &'static str {
        file_type(&self.name)
    }

    pub fn line_count(&self) -> usize {
        count_lines(&self.content)
    }

    pub fn char_count(&self) -> usize {
        count_chars(&self.content)
    }
}

/// Insertion-ordered collection of loaded files.
///
/// Only grows by appending and only shrinks by [`clear`](Self::clear).
/// Files are shared behind `Arc` so state snapshots stay cheap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileCollection {
    files: Vec<Arc<LoadedFile>>,
}

impl FileCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, file: LoadedFile) {
        self.files.push(Arc::new(file));
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<LoadedFile>> {
        self.files.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<LoadedFile>> {
        self.files.iter()
    }
}

impl FromIterator<LoadedFile> for FileCollection {
    fn from_iter<I: IntoIterator<Item = LoadedFile>>(iter: I) -> Self {
        Self {
            files: iter.into_iter().map(Arc::new).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FileCollection {
    type Item = &'a Arc<LoadedFile>;
    type IntoIter = std::slice::Iter<'a, Arc<LoadedFile>>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loaded_file_derived_fields() {
        let file = LoadedFile::new("a.txt", "hello\nworld".to_string(), 11, 0);
        assert_eq!(file.file_type(), "Plain Text");
        assert_eq!(file.line_count(), 2);
        assert_eq!(file.char_count(), 11);
    }

    #[test]
    fn test_collection_preserves_insertion_order() {
        let mut files = FileCollection::new();
        files.push(LoadedFile::new("z.rs", String::new(), 0, 0));
        files.push(LoadedFile::new("a.rs", String::new(), 0, 0));
        files.push(LoadedFile::new("z.rs", String::new(), 0, 0));

        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["z.rs", "a.rs", "z.rs"]);

        files.clear();
        assert!(files.is_empty());
    }
}
