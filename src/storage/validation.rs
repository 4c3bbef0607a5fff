//! Path normalization
//!
//! Request paths arrive from a browser and may mix `/` and `\`.

use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Rewrites foreign separators to the host convention.
///
/// On Windows `/` becomes `\`; elsewhere the path is left as given.
pub fn normalize_separators(path: &str) -> String {
    if MAIN_SEPARATOR == '\\' {
        path.replace('/', "\\")
    } else {
        path.to_string()
    }
}

/// Normalizes separators and drops trailing ones, keeping a bare root intact
pub fn normalize_path(path: &str) -> PathBuf {
    let normalized = normalize_separators(path.trim());
    let trimmed = normalized.trim_end_matches(MAIN_SEPARATOR);
    if trimmed.is_empty() || trimmed.ends_with(':') {
        PathBuf::from(normalized)
    } else {
        PathBuf::from(trimmed)
    }
}

/// Whether the file name carries an extension (`.env` style names count)
pub fn has_extension(name: &str) -> bool {
    name.contains('.')
}

/// Lowercased extension of `path`, empty when there is none
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
