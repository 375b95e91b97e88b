use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

/// Default directory depth scanned below the root.
pub const DEFAULT_MAX_DEPTH: usize = 5;
/// Default report file name, relative to the working directory.
pub const DEFAULT_OUTPUT_FILE: &str = "output.txt";

/// Application configuration loaded from TOML config file.
/// Every field is optional; CLI flags take precedence.
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Directory levels scanned below the root.
    pub max_depth: Option<usize>,
    /// Where `--to-file` writes when `--output-path` is not given.
    pub output_path: Option<PathBuf>,
    /// Always show per-album duration and size.
    pub per_album: bool,
    /// Always hide the quick stats line.
    pub no_quick_stats: bool,
}

impl AppConfig {
    /// Load `~/.config/tagaudit/config.toml`. A missing file means defaults;
    /// an unreadable or invalid one is logged and ignored.
    pub fn load() -> Self {
        let Some(path) = Self::config_path().filter(|p| p.exists()) else {
            log::debug!("No config file found, using defaults");
            return Self::default();
        };
        Self::load_from(&path).unwrap_or_default()
    }

    fn load_from(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| log::warn!("Failed to read {}: {}. Using defaults.", path.display(), e))
            .ok()?;
        let config = Self::parse(&contents)
            .map_err(|e| log::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e))
            .ok()?;
        log::info!("Loaded config from {}", path.display());
        Some(config)
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn resolve_max_depth(&self) -> usize {
        self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH)
    }

    pub fn resolve_output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE))
    }

    /// Get the config file path.
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", crate::APP_NAME)
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
