pub mod audit;
pub mod config;
pub mod models;
pub mod output;
pub mod report;
pub mod scanner;

/// Audio file extensions we consider for scanning
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "mp3", "flac", "ogg", "oga", "opus", "wav", "m4a", "aac",
];

/// Application name for XDG paths
pub const APP_NAME: &str = "tagaudit";

/// True when the path's extension (case-insensitive) is one we scan.
pub fn is_supported(path: &std::path::Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    SUPPORTED_EXTENSIONS.contains(&ext.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn supported_extensions_are_case_insensitive() {
        assert!(is_supported(Path::new("/music/a/01.MP3")));
        assert!(is_supported(Path::new("track.Flac")));
        assert!(is_supported(Path::new("x.oga")));
        assert!(is_supported(Path::new("x.opus")));
    }

    #[test]
    fn unsupported_extensions_are_rejected() {
        assert!(!is_supported(Path::new("cover.jpg")));
        assert!(!is_supported(Path::new("notes.txt")));
        assert!(!is_supported(Path::new("README")));
        assert!(!is_supported(Path::new("mp3")));
    }
}
