//! Property-based tests for formatting, classification, chunked reads and search

use files_to_text::LoadedFile;
use files_to_text::services::{
    ChunkedReader, DEFAULT_FILE_TYPE, MemoryFile, SearchQuery, count_lines, file_type,
    filter_files, format_bytes,
};
use proptest::prelude::*;
use std::sync::Arc;

/// Split "1.5 KB" into (1.5, "KB")
fn parse_size(formatted: &str) -> (f64, String) {
    let (value, unit) = formatted.split_once(' ').unwrap();
    (value.parse().unwrap(), unit.to_string())
}

fn loaded_files() -> impl Strategy<Value = Vec<Arc<LoadedFile>>> {
    prop::collection::vec(("[a-z]{1,8}\\.(txt|rs|md)", "[a-zA-Z \n]{0,60}"), 0..8).prop_map(
        |files| {
            files
                .into_iter()
                .map(|(name, content)| {
                    let size = content.len() as u64;
                    Arc::new(LoadedFile::new(name, content, size, 0))
                })
                .collect()
        },
    )
}

#[test]
fn test_zero_bytes() {
    assert_eq!(format_bytes(0), "0 Bytes");
}

proptest! {
    #[test]
    fn prop_byte_format_in_range(bytes in 1u64..(1000u64 << 30)) {
        let (value, unit) = parse_size(&format_bytes(bytes));

        prop_assert!(["Bytes", "KB", "MB", "GB"].contains(&unit.as_str()));
        prop_assert!(value >= 1.0, "{} bytes formatted as {}", bytes, value);
        prop_assert!(value < 1024.0, "{} bytes formatted as {}", bytes, value);
    }

    #[test]
    fn prop_line_count_is_newlines_plus_one(text in "[a-z \n]{0,200}") {
        let newlines = text.matches('\n').count();
        prop_assert_eq!(count_lines(&text), newlines + 1);
    }

    #[test]
    fn prop_crlf_counts_as_one_break(text in "[a-z \n]{0,200}") {
        prop_assert_eq!(count_lines(&text.replace('\n', "\r\n")), count_lines(&text));
    }

    #[test]
    fn prop_classifier_is_total(name in "\\PC{0,30}") {
        prop_assert!(!file_type(&name).is_empty());
    }

    #[test]
    fn prop_names_without_extension_are_plain_text(name in "[a-zA-Z0-9_-]{0,20}") {
        prop_assert_eq!(file_type(&name), DEFAULT_FILE_TYPE);
    }

    #[test]
    fn prop_chunked_read_round_trip(text in "\\PC{0,300}", chunk_size in 1usize..64) {
        prop_assume!(!text.starts_with('\u{feff}'));

        let file = MemoryFile::new("round.txt", text.as_bytes(), 0);
        let decoded = tokio_test::block_on(
            ChunkedReader::new(chunk_size).read_to_string(&file, None),
        )
        .unwrap();

        prop_assert_eq!(decoded, text);
    }

    #[test]
    fn prop_filter_is_idempotent(files in loaded_files(), term in "[a-z]{0,2}") {
        let query = SearchQuery::new(&term);

        let once = filter_files(&query, &files);
        let twice = filter_files(&query, &once);

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_empty_term_keeps_everything(files in loaded_files()) {
        let filtered = filter_files(&SearchQuery::new(""), &files);
        prop_assert_eq!(filtered, files);
    }

    #[test]
    fn prop_highlight_reconstructs_text(text in "[a-zA-Z .*]{0,80}", term in "[a-z.*]{1,3}") {
        let query = SearchQuery::new(&term);
        let segments = query.highlight(&text);

        let rebuilt: String = segments.iter().map(|segment| segment.text).collect();
        prop_assert_eq!(&rebuilt, &text);

        for segment in segments.iter().filter(|segment| segment.highlighted) {
            prop_assert!(segment.text.eq_ignore_ascii_case(&term));
        }
    }
}
