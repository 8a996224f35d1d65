//! Maps file names to human-readable type labels.

/// Label used when the extension is missing or not in the table.
pub const DEFAULT_FILE_TYPE: &str = "Plain Text";

/// Extract the lowercased extension after the last `.`.
///
/// Returns `None` for names without a dot and for names ending in a dot.
pub fn extension_of(file_name: &str) -> Option<String> {
    let (_, extension) = file_name.rsplit_once('.')?;
    if extension.is_empty() {
        None
    } else {
        Some(extension.to_lowercase())
    }
}

/// Get the type label for a file name.
///
/// Never fails: unknown or missing extensions fall back to [`DEFAULT_FILE_TYPE`].
pub fn file_type(file_name: &str) -> &'static str {
    extension_of(file_name)
        .and_then(|ext| label_for_extension(&ext))
        .unwrap_or(DEFAULT_FILE_TYPE)
}

/// Look up a lowercased extension in the static type table.
pub fn label_for_extension(extension: &str) -> Option<&'static str> {
    let label = match extension {
        "rs" => "Rust",
        "ts" => "TypeScript",
        "tsx" => "TypeScript React",
        "js" => "JavaScript",
        "jsx" => "JavaScript React",
        "py" => "Python",
        "java" => "Java",
        "cpp" => "C++",
        "c" => "C",
        "go" => "Go",
        "rb" => "Ruby",
        "php" => "PHP",
        "html" => "HTML",
        "css" => "CSS",
        "json" => "JSON",
        "jsonl" => "JSON Lines",
        "md" => "Markdown",
        "txt" => "Plain Text",
        "yml" | "yaml" => "YAML",
        "xml" => "XML",
        "sql" => "SQL",
        "sh" => "Shell Script",
        "bash" => "Bash Script",
        "ps1" => "PowerShell",
        "bat" => "Batch File",
        "r" => "R",
        "swift" => "Swift",
        "kt" => "Kotlin",
        "dart" => "Dart",
        "lua" => "Lua",
        "ex" => "Elixir",
        "exs" => "Elixir Script",
        _ => return None,
    };
    Some(label)
}
