//! Supporting helpers: coloured message prefixes and display paths.

use owo_colors::OwoColorize;
use std::path::Path;

pub fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

pub fn error_prefix() -> String {
    if colors_enabled() {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}

pub fn warn_prefix() -> String {
    if colors_enabled() {
        "warning:".yellow().bold().to_string()
    } else {
        "warning:".to_string()
    }
}

pub fn note_prefix() -> String {
    if colors_enabled() {
        "note:".cyan().bold().to_string()
    } else {
        "note:".to_string()
    }
}

/// `path` relative to `base` when possible, for shorter diagnostics.
pub fn display_path(path: &Path, base: &Path) -> String {
    let abs = |p: &Path| {
        std::fs::canonicalize(p).unwrap_or_else(|_| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                std::env::current_dir().unwrap_or_default().join(p)
            }
        })
    };
    pathdiff::diff_paths(abs(path), abs(base))
        .filter(|rel| !rel.starts_with(".."))
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}
