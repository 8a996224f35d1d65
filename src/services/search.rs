//! Case-insensitive filtering and highlight segmentation.

use crate::models::LoadedFile;
use crate::services::format::split_lines;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;

/// A run of text, either plain or matching the search term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub highlighted: bool,
}

impl<'a> Segment<'a> {
    fn plain(text: &'a str) -> Self {
        Self {
            text,
            highlighted: false,
        }
    }

    fn highlighted(text: &'a str) -> Self {
        Self {
            text,
            highlighted: true,
        }
    }
}

/// A line containing at least one match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchLine<'a> {
    /// 1-based line number
    pub line_number: usize,
    pub segments: Vec<Segment<'a>>,
}

/// A compiled search term.
///
/// The term is matched literally (regex metacharacters have no meaning) and
/// case-insensitively. An empty term matches everything and highlights nothing.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    term: String,
    pattern: Option<Regex>,
}

impl SearchQuery {
    pub fn new(term: &str) -> Self {
        let pattern = if term.is_empty() {
            None
        } else {
            // An escaped literal always compiles; a failure only happens past the size limit
            RegexBuilder::new(&regex::escape(term))
                .case_insensitive(true)
                .build()
                .inspect_err(|e| tracing::warn!("Search term could not be compiled: {}", e))
                .ok()
        };

        Self {
            term: term.to_string(),
            pattern,
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }

    /// Check whether the text contains the term
    pub fn is_match(&self, text: &str) -> bool {
        match &self.pattern {
            Some(pattern) => pattern.is_match(text),
            None => self.term.is_empty() || text.to_lowercase().contains(&self.term.to_lowercase()),
        }
    }

    /// Check whether a file's name or content contains the term
    pub fn matches_file(&self, file: &LoadedFile) -> bool {
        self.is_empty() || self.is_match(&file.name) || self.is_match(&file.content)
    }

    /// Split text into plain and highlighted segments.
    ///
    /// Matches are leftmost and non-overlapping. Concatenating the segment
    /// texts reproduces the input exactly.
    pub fn highlight<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        let Some(pattern) = &self.pattern else {
            return vec![Segment::plain(text)];
        };

        let mut segments = Vec::new();
        let mut last_end = 0;

        for found in pattern.find_iter(text) {
            if found.start() > last_end {
                segments.push(Segment::plain(&text[last_end..found.start()]));
            }
            segments.push(Segment::highlighted(found.as_str()));
            last_end = found.end();
        }

        if last_end < text.len() || segments.is_empty() {
            segments.push(Segment::plain(&text[last_end..]));
        }

        segments
    }

    /// Count matches in the text
    pub fn count_matches(&self, text: &str) -> usize {
        self.pattern
            .as_ref()
            .map_or(0, |pattern| pattern.find_iter(text).count())
    }

    /// Segment each line of `text` that contains a match, up to `limit` lines.
    pub fn matching_lines<'a>(&self, text: &'a str, limit: usize) -> Vec<MatchLine<'a>> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };

        split_lines(text)
            .enumerate()
            .filter(|(_, line)| pattern.is_match(line))
            .take(limit)
            .map(|(index, line)| MatchLine {
                line_number: index + 1,
                segments: self.highlight(line),
            })
            .collect()
    }
}

/// Files whose name or content contains the term, in their original order
pub fn filter_files<'a, I>(query: &SearchQuery, files: I) -> Vec<Arc<LoadedFile>>
where
    I: IntoIterator<Item = &'a Arc<LoadedFile>>,
{
    files
        .into_iter()
        .filter(|file| query.matches_file(file))
        .cloned()
        .collect()
}

/// Convenience wrapper for one-off highlighting
pub fn highlight<'a>(text: &'a str, term: &str) -> Vec<Segment<'a>> {
    SearchQuery::new(term).highlight(text)
}
