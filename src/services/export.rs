use crate::models::LoadedFile;
use crate::services::format::{format_date, format_kilobytes};
use std::fmt::Write;
use std::sync::Arc;

const HEADER_RULE: &str = "----------------------------------------";
const FOOTER_RULE: &str = "========================================";

/// Render one file block of the "copy all" export
pub fn render_file(file: &LoadedFile) -> String {
    let mut block = String::with_capacity(file.content.len() + 256);
    // Writing into a String cannot fail
    let _ = write!(
        block,
        "File: {}\nType: {}\nSize: {} KB\nLines: {}\nLast Modified: {}\n{}\n{}\n{}\n",
        file.name,
        file.file_type(),
        format_kilobytes(file.size),
        file.line_count(),
        format_date(file.last_modified),
        HEADER_RULE,
        file.content,
        FOOTER_RULE,
    );
    block
}

/// Render every file, separated by a blank line
pub fn render_all<'a, I>(files: I) -> String
where
    I: IntoIterator<Item = &'a Arc<LoadedFile>>,
{
    files
        .into_iter()
        .map(|file| render_file(file))
        .collect::<Vec<_>>()
        .join("\n")
}
