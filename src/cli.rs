//! Console front-end: ingest paths, print the summary, optionally copy.

use crate::app::AppController;
use crate::config::DEFAULT_CONFIG_DIR;
use crate::models::AppState;
use crate::services::format::{format_bytes, format_count, format_date, split_lines};
use crate::services::search::{SearchQuery, Segment};
use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::fmt::Write;
use std::process::ExitCode;

/// Matching lines printed per file
const MAX_MATCH_LINES: usize = 5;

const HIGHLIGHT_START: &str = "\x1b[1;33m";
const HIGHLIGHT_END: &str = "\x1b[0m";

/// Command-line arguments
#[derive(clap::Parser, Debug, Clone, Default)]
#[command(
    name = "files-to-text",
    version = crate::VERSION,
    about = "Load text files, inspect their statistics and copy their contents"
)]
pub struct Cli {
    /// Files to load, in order
    pub paths: Vec<Utf8PathBuf>,

    /// Only list files whose name or content contains this term (case-insensitive)
    #[arg(short, long)]
    pub search: Option<String>,

    /// Copy every loaded file to the clipboard using the export template
    #[arg(long, conflicts_with = "copy_file")]
    pub copy_all: bool,

    /// Copy one file's content to the clipboard (1-based, as listed)
    #[arg(long, value_name = "N")]
    pub copy_file: Option<usize>,

    /// Print the content of every listed file
    #[arg(long)]
    pub show_content: bool,

    /// Disable highlighting of search matches
    #[arg(long)]
    pub no_color: bool,

    /// Directory holding `Files To Text Config.yaml`
    #[arg(long, value_name = "DIR", default_value = DEFAULT_CONFIG_DIR)]
    pub config_dir: Utf8PathBuf,

    /// Open the window instead of printing a report
    #[cfg(feature = "gui")]
    #[arg(long)]
    pub gui: bool,
}

/// How the report is rendered
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    pub show_content: bool,
    pub color: bool,
}

/// Ingest the given paths, print the report and run the requested copy.
///
/// Ingestion and copy failures are reported on stderr and turn into a failing
/// exit code; files loaded before a failure are still listed.
pub async fn run(controller: &AppController, cli: &Cli) -> Result<ExitCode> {
    let mut failed = false;

    if !cli.paths.is_empty() {
        if let Err(e) = controller.ingest_paths(&cli.paths).await {
            eprintln!("Error: {}", e);
            failed = true;
        }
    }

    if let Some(term) = &cli.search {
        controller.set_search_term(term.as_str());
    }

    let options = ReportOptions {
        show_content: cli.show_content,
        color: !cli.no_color,
    };
    print!("{}", render_report(&controller.snapshot(), options));

    if let Some(number) = cli.copy_file {
        let index = number
            .checked_sub(1)
            .with_context(|| format!("File numbers start at 1, got {}", number))?;
        match controller.copy_file(index).await {
            Ok(()) => println!("Copied file {} to the clipboard.", number),
            Err(e) => {
                eprintln!("Error: {}", e);
                failed = true;
            }
        }
    } else if cli.copy_all {
        match controller.copy_all().await {
            Ok(()) => println!("Copied all files to the clipboard."),
            Err(e) => {
                eprintln!("Error: {}", e);
                failed = true;
            }
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Render the summary, type breakdown and the filtered file list
pub fn render_report(state: &AppState, options: ReportOptions) -> String {
    let mut out = String::new();

    if state.files.is_empty() {
        out.push_str("No files loaded.\n");
        return out;
    }

    let stats = state.stats();
    // Writing into a String cannot fail
    let _ = writeln!(
        out,
        "Files: {}  Size: {}  Lines: {}  Characters: {}",
        format_count(stats.total_files),
        format_bytes(stats.total_size),
        format_count(stats.total_lines),
        format_count(stats.total_characters),
    );

    let breakdown = stats
        .sorted_breakdown()
        .into_iter()
        .map(|(label, count)| format!("{} ({})", label, count))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(out, "Types: {}", breakdown);

    let query = state.query();
    let visible = state.visible_files();

    if !query.is_empty() {
        if visible.is_empty() {
            let _ = writeln!(out, "\nNo files match \"{}\".", query.term());
            return out;
        }
        let _ = writeln!(
            out,
            "\nShowing {} of {} files matching \"{}\"",
            visible.len(),
            state.files.len(),
            query.term()
        );
    }

    for (index, file) in &visible {
        let _ = writeln!(
            out,
            "\n[{}] {}  {}  {}  {} lines  {} chars  {}",
            index + 1,
            file.name,
            file.file_type(),
            format_bytes(file.size),
            format_count(file.line_count()),
            format_count(file.char_count()),
            format_date(file.last_modified),
        );

        if !query.is_empty() {
            let matches = query.count_matches(&file.content);
            let _ = writeln!(
                out,
                "    {} {}",
                matches,
                if matches == 1 { "match" } else { "matches" }
            );
            for line in query.matching_lines(&file.content, MAX_MATCH_LINES) {
                let _ = writeln!(
                    out,
                    "    {:>5}: {}",
                    line.line_number,
                    paint(&line.segments, options.color)
                );
            }
        }

        if options.show_content {
            push_content(&mut out, &query, &file.content, options.color);
        }
    }

    out
}

fn push_content(out: &mut String, query: &SearchQuery, content: &str, color: bool) {
    out.push_str("    ---\n");
    for line in split_lines(content) {
        out.push_str("    ");
        out.push_str(&paint(&query.highlight(line), color));
        out.push('\n');
    }
    out.push_str("    ---\n");
}

/// Join segments, wrapping highlighted runs in ANSI bold yellow or `[[...]]`
fn paint(segments: &[Segment<'_>], color: bool) -> String {
    let mut painted = String::new();
    for segment in segments {
        match (segment.highlighted, color) {
            (false, _) => painted.push_str(segment.text),
            (true, true) => {
                painted.push_str(HIGHLIGHT_START);
                painted.push_str(segment.text);
                painted.push_str(HIGHLIGHT_END);
            }
            (true, false) => {
                painted.push_str("[[");
                painted.push_str(segment.text);
                painted.push_str("]]");
            }
        }
    }
    painted
}
