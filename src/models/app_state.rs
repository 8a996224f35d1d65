use crate::models::{FileCollection, LoadedFile};
use crate::services::search::{SearchQuery, filter_files};
use crate::services::stats::Stats;
use std::collections::BTreeSet;
use std::sync::Arc;

/// What the transient "Copied!" indicator refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CopyTarget {
    /// A single file, by index into the collection
    File(usize),
    /// The "copy all" export
    All,
}

/// Single source of truth for all application state.
///
/// Wrapped in `Arc<RwLock<AppState>>` by [`crate::state::StateManager`]; never
/// mutate it directly, go through the manager so change events are emitted.
/// Statistics and the filtered view are derived on demand, never stored.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    /// Loaded files in insertion order
    pub files: FileCollection,

    /// Session-wide search term (filter and highlight)
    pub search_term: String,

    /// True while a batch is being ingested
    pub is_loading: bool,

    /// Last user-visible error (validation or read failure)
    pub error_message: Option<String>,

    /// Target of the most recent successful copy, while the indicator shows
    pub copied: Option<CopyTarget>,

    /// Bumped on every successful copy; an indicator timer only clears its own copy
    pub copy_generation: u64,

    /// Indices of files whose content is expanded in the UI
    pub expanded: BTreeSet<usize>,
}

impl AppState {
    /// Rollup statistics over all loaded files
    pub fn stats(&self) -> Stats {
        Stats::compute(&self.files)
    }

    /// Compiled query for the current search term
    pub fn query(&self) -> SearchQuery {
        SearchQuery::new(&self.search_term)
    }

    /// Files matching the current search term, with their collection indices
    pub fn visible_files(&self) -> Vec<(usize, Arc<LoadedFile>)> {
        let query = self.query();
        self.files
            .iter()
            .enumerate()
            .filter(|(_, file)| query.matches_file(file))
            .map(|(index, file)| (index, Arc::clone(file)))
            .collect()
    }

    /// Files matching the current search term
    pub fn filtered_files(&self) -> Vec<Arc<LoadedFile>> {
        filter_files(&self.query(), &self.files)
    }

    /// Drop all files, the search term and any per-file UI state
    pub fn clear(&mut self) {
        self.files.clear();
        self.search_term.clear();
        self.expanded.clear();
        self.copied = None;
        self.error_message = None;
    }
}
