use std::fs;
use std::path::Path;

pub(super) fn format_fixed_f64(value: f64, width: usize, precision: usize) -> String {
    format!(
        "{value:>width$.precision$}",
        width = width,
        precision = precision
    )
}

/// Scientific notation for table cells; non-finite values print as `NaN`/`inf`.
pub(super) fn format_scientific_f64(value: f64, precision: usize) -> String {
    format!("{value:.precision$e}", precision = precision)
}

pub(super) fn normalize_text_artifact(content: &str) -> String {
    let mut normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    if !normalized.is_empty() && !normalized.ends_with('\n') {
        normalized.push('\n');
    }
    normalized
}

pub(super) fn write_text_artifact(path: &Path, content: &str) -> std::io::Result<()> {
    fs::write(path, normalize_text_artifact(content))
}

/// Replaces characters that are unsafe in file names with `_`.
pub(super) fn artifact_file_component(label: &str) -> String {
    let cleaned: String = label
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.' | ' ') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}
