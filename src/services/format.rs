//! Display formatting for sizes, timestamps and counts.

use chrono::{Local, TimeZone};

const BYTE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
const UNIT_BASE: f64 = 1024.0;

/// Format a byte count using the largest base-1024 unit whose value is at least 1.
///
/// Values are rounded to two decimals with trailing zeros dropped
/// (`1536` → `"1.5 KB"`). Zero renders as `"0 Bytes"`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    while unit < BYTE_UNITS.len() - 1 && bytes >= 1024u64.pow(unit as u32 + 1) {
        unit += 1;
    }

    let mut value = round_hundredths(bytes as f64 / UNIT_BASE.powi(unit as i32));

    // 1048575 bytes would otherwise print as "1024 KB"
    if value >= UNIT_BASE && unit < BYTE_UNITS.len() - 1 {
        unit += 1;
        value = round_hundredths(bytes as f64 / UNIT_BASE.powi(unit as i32));
    }

    format!("{} {}", value, BYTE_UNITS[unit])
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format a size as kilobytes with exactly two decimals (`"0.13"` for 128 bytes).
///
/// Ties round up, so the integer arithmetic keeps the result exact.
pub fn format_kilobytes(bytes: u64) -> String {
    let hundredths = (u128::from(bytes) * 100 + 512) / 1024;
    format!("{}.{:02}", hundredths / 100, hundredths % 100)
}

/// Render an epoch-millisecond timestamp in the local timezone.
///
/// Instants chrono cannot represent fall back to the raw millisecond value.
pub fn format_date(timestamp_ms: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms).earliest() {
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => timestamp_ms.to_string(),
    }
}

/// Count line segments, treating `\r\n`, `\r` and `\n` as one break each.
///
/// A file ending in a newline counts one extra (empty) segment, and the empty
/// string counts as one line.
pub fn count_lines(content: &str) -> usize {
    split_lines(content).count()
}

/// Split content into the same segments [`count_lines`] counts.
///
/// Breaks are `\r\n`, then `\r`, then `\n`; a trailing break yields a final
/// empty segment.
pub fn split_lines(content: &str) -> LineSegments<'_> {
    LineSegments {
        rest: Some(content),
    }
}

/// Iterator returned by [`split_lines`]
#[derive(Debug, Clone)]
pub struct LineSegments<'a> {
    rest: Option<&'a str>,
}

impl<'a> Iterator for LineSegments<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let rest = self.rest?;

        match rest.find(['\r', '\n']) {
            Some(pos) => {
                let break_len = if rest[pos..].starts_with("\r\n") { 2 } else { 1 };
                self.rest = Some(&rest[pos + break_len..]);
                Some(&rest[..pos])
            }
            None => {
                self.rest = None;
                Some(rest)
            }
        }
    }
}

/// Count Unicode scalar values in the content.
pub fn count_chars(content: &str) -> usize {
    content.chars().count()
}

/// Group digits in thousands (`1234567` → `"1,234,567"`).
pub fn format_count(count: usize) -> String {
    let digits = count.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}
