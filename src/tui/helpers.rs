//! Small formatting helpers for the TUI

use std::path::PathBuf;

/// Formats a byte count as "512 B", "2.0 KB", "1.5 MB", ...
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", size, UNITS[unit])
}

/// Expands a leading `~` and trims surrounding whitespace from a typed path
pub fn expand_path(input: &str) -> Option<PathBuf> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if input == "~" {
        return dirs::home_dir();
    }

    if let Some(rest) = input.strip_prefix("~/") {
        return dirs::home_dir().map(|home| home.join(rest));
    }

    Some(PathBuf::from(input))
}

/// Keeps the tail of a long path so it fits in `max_width` columns
pub fn truncate_path(path: &str, max_width: usize) -> String {
    let count = path.chars().count();
    if count <= max_width || max_width < 4 {
        return path.to_string();
    }

    let tail: String = path.chars().skip(count - (max_width - 1)).collect();
    format!("…{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(2048), "2.0 KB");
        assert_eq!(format_file_size(1536 * 1024), "1.5 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path("   "), None);
        assert_eq!(expand_path(" /astro/lights "), Some(PathBuf::from("/astro/lights")));

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~"), Some(home.clone()));
            assert_eq!(expand_path("~/darks"), Some(home.join("darks")));
        }
    }

    #[test]
    fn test_truncate_path() {
        assert_eq!(truncate_path("/a/b", 10), "/a/b");
        let truncated = truncate_path("/very/long/path/to/lights", 10);
        assert_eq!(truncated.chars().count(), 10);
        assert!(truncated.starts_with('…'));
        assert!(truncated.ends_with("lights"));
    }
}
