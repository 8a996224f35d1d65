use crate::models::LoadedFile;
use indexmap::IndexMap;
use std::sync::Arc;

/// Rollup statistics over the loaded files.
///
/// Always derived from the current collection, never patched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    pub total_files: usize,
    pub total_size: u64,
    pub total_lines: usize,
    pub total_characters: usize,

    /// Type label → file count, in order of first occurrence
    pub type_breakdown: IndexMap<String, usize>,
}

impl Stats {
    /// Compute statistics for a set of files
    pub fn compute<'a, I>(files: I) -> Self
    where
        I: IntoIterator<Item = &'a Arc<LoadedFile>>,
    {
        files.into_iter().fold(Self::default(), |mut stats, file| {
            stats.total_files += 1;
            stats.total_size += file.size;
            stats.total_lines += file.line_count();
            stats.total_characters += file.char_count();
            *stats
                .type_breakdown
                .entry(file.file_type().to_string())
                .or_insert(0) += 1;
            stats
        })
    }

    /// Type breakdown ordered by count descending, ties by first occurrence
    pub fn sorted_breakdown(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self
            .type_breakdown
            .iter()
            .map(|(label, count)| (label.as_str(), *count))
            .collect();
        // Stable sort keeps first-occurrence order among equal counts
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}
