// Window view model
//
// Plain `Send` data derived from an AppState snapshot. It is built off the UI
// thread and converted to Slint models inside the event loop, since Slint
// models are not `Send`.

use crate::models::{AppState, CopyTarget, LoadedFile};
use crate::services::format::{format_bytes, format_count, format_date, split_lines};
use crate::services::search::{MatchLine, SearchQuery};
use std::sync::Arc;

/// Matching lines previewed on a collapsed card
pub const PREVIEW_MATCH_LINES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanView {
    pub text: String,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineView {
    pub line_number: usize,
    pub spans: Vec<SpanView>,
}

impl From<MatchLine<'_>> for LineView {
    fn from(line: MatchLine<'_>) -> Self {
        Self {
            line_number: line.line_number,
            spans: line
                .segments
                .into_iter()
                .map(|segment| SpanView {
                    text: segment.text.to_string(),
                    highlighted: segment.highlighted,
                })
                .collect(),
        }
    }
}

/// One file card
#[derive(Debug, Clone)]
pub struct FileView {
    pub index: usize,
    pub file: Arc<LoadedFile>,
    pub type_label: &'static str,
    pub size: String,
    pub modified: String,
    pub lines: String,
    pub characters: String,
    pub expanded: bool,
    pub copied: bool,
    pub match_count: usize,

    /// First matching lines, shown while collapsed
    pub matches: Vec<LineView>,

    /// Every line with highlights, only while expanded with a search term
    pub content_lines: Vec<LineView>,
}

impl FileView {
    fn new(index: usize, file: Arc<LoadedFile>, state: &AppState, query: &SearchQuery) -> Self {
        let expanded = state.expanded.contains(&index);

        let (match_count, matches, content_lines) = if query.is_empty() {
            (0, Vec::new(), Vec::new())
        } else {
            let content_lines = if expanded {
                split_lines(&file.content)
                    .enumerate()
                    .map(|(i, line)| {
                        LineView::from(MatchLine {
                            line_number: i + 1,
                            segments: query.highlight(line),
                        })
                    })
                    .collect()
            } else {
                Vec::new()
            };

            let matches = query
                .matching_lines(&file.content, PREVIEW_MATCH_LINES)
                .into_iter()
                .map(LineView::from)
                .collect();

            (query.count_matches(&file.content), matches, content_lines)
        };

        Self {
            index,
            type_label: file.file_type(),
            size: format_bytes(file.size),
            modified: format_date(file.last_modified),
            lines: format_count(file.line_count()),
            characters: format_count(file.char_count()),
            expanded,
            copied: state.copied == Some(CopyTarget::File(index)),
            match_count,
            matches,
            content_lines,
            file,
        }
    }

    /// Raw content for the expanded plain view; empty otherwise.
    ///
    /// Collapsed cards and highlighted expansions never carry the full text.
    pub fn expanded_content(&self) -> &str {
        if self.expanded && self.content_lines.is_empty() {
            &self.file.content
        } else {
            ""
        }
    }
}

/// Everything the main window shows
#[derive(Debug, Clone, Default)]
pub struct WindowView {
    pub files: Vec<FileView>,
    pub type_breakdown: Vec<(String, usize)>,
    pub total_files: String,
    pub total_size: String,
    pub total_lines: String,
    pub total_characters: String,
    pub is_loading: bool,
    pub error_message: String,
    pub all_copied: bool,
    pub has_files: bool,
    pub filter_summary: String,
}

impl WindowView {
    pub fn from_state(state: &AppState) -> Self {
        let stats = state.stats();
        let query = state.query();

        let files: Vec<FileView> = state
            .visible_files()
            .into_iter()
            .map(|(index, file)| FileView::new(index, file, state, &query))
            .collect();

        let filter_summary = if query.is_empty() || state.files.is_empty() {
            String::new()
        } else if files.is_empty() {
            format!("No files match \"{}\"", query.term())
        } else {
            format!(
                "Showing {} of {} files matching \"{}\"",
                files.len(),
                state.files.len(),
                query.term()
            )
        };

        Self {
            type_breakdown: stats
                .sorted_breakdown()
                .into_iter()
                .map(|(label, count)| (label.to_string(), count))
                .collect(),
            total_files: format_count(stats.total_files),
            total_size: format_bytes(stats.total_size),
            total_lines: format_count(stats.total_lines),
            total_characters: format_count(stats.total_characters),
            is_loading: state.is_loading,
            error_message: state.error_message.clone().unwrap_or_default(),
            all_copied: state.copied == Some(CopyTarget::All),
            has_files: !state.files.is_empty(),
            filter_summary,
            files,
        }
    }
}
