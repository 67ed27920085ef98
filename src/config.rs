//! Resolver configuration loader describing the site layout.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::project::SiteLayout;

/// File name searched for by [`ResolverConfig::discover`].
pub const DEFAULT_CONFIG_FILE: &str = "depth_images.config.json";

/// Discoverable configuration describing directory names and placeholder markup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Directory holding the explore pages and the canonical images directory.
    pub explore_dir: String,
    /// Directory name for game pages.
    pub game_dir: String,
    /// Directory holding image assets inside the explore directory.
    pub images_dir: String,
    /// Attribute carrying the logical image path.
    pub declared_path_attribute: String,
    /// Attribute flagging activated placeholders.
    pub loaded_attribute: String,
    /// Class of loading-indicator elements cleared once an image loads.
    pub loading_indicator_class: String,
    /// Re-scan delays in milliseconds after the page-ready pass.
    pub rescan_delays_ms: Vec<u64>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        let layout = SiteLayout::default();
        Self {
            explore_dir: layout.explore_dir,
            game_dir: layout.game_dir,
            images_dir: layout.images_dir,
            declared_path_attribute: layout.declared_path_attribute,
            loaded_attribute: layout.loaded_attribute,
            loading_indicator_class: layout.loading_indicator_class,
            rescan_delays_ms: layout
                .rescan_delays
                .iter()
                .map(|delay| delay.as_millis() as u64)
                .collect(),
        }
    }
}

/// Errors raised when an explicitly requested configuration file cannot be used.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    Io {
        /// Path that caused the error.
        path: PathBuf,
        /// Source I/O error.
        source: std::io::Error,
    },
    /// Failed to parse the JSON configuration file.
    Parse {
        /// Path that caused the error.
        path: PathBuf,
        /// Source parse error.
        source: serde_json::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read {}: {}", path.display(), source),
            Self::Parse { path, source } => {
                write!(f, "failed to parse {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

impl ResolverConfig {
    /// Attempt to load configuration from the provided directory.
    ///
    /// A missing or malformed file yields the default configuration.
    pub fn discover(dir: &Path) -> Self {
        let candidate = dir.join(DEFAULT_CONFIG_FILE);
        match Self::from_path(&candidate) {
            Ok(config) => config,
            Err(ConfigError::Io { .. }) => Self::default(),
            Err(err) => {
                tracing::warn!("ignoring configuration: {err}");
                Self::default()
            }
        }
    }

    /// Read configuration from a specific JSON file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Convert the configuration into an owned layout description.
    pub fn into_layout(self) -> SiteLayout {
        SiteLayout {
            explore_dir: trim_dir(self.explore_dir),
            game_dir: trim_dir(self.game_dir),
            images_dir: trim_dir(self.images_dir),
            declared_path_attribute: self.declared_path_attribute,
            loaded_attribute: self.loaded_attribute,
            loading_indicator_class: self.loading_indicator_class,
            rescan_delays: self
                .rescan_delays_ms
                .into_iter()
                .map(Duration::from_millis)
                .collect(),
        }
    }

    /// Borrowing conversion into a layout, cloning the underlying strings.
    pub fn to_layout(&self) -> SiteLayout {
        self.clone().into_layout()
    }
}

fn trim_dir(value: String) -> String {
    value.trim().trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_matches_default_layout() {
        assert_eq!(ResolverConfig::default().into_layout(), SiteLayout::default());
    }

    #[test]
    fn discover_falls_back_to_defaults_without_file() {
        let temp = tempdir().expect("failed to create temp dir");
        assert_eq!(ResolverConfig::discover(temp.path()), ResolverConfig::default());
    }

    #[test]
    fn discover_falls_back_to_defaults_for_malformed_file() {
        let temp = tempdir().expect("failed to create temp dir");
        std::fs::write(temp.path().join(DEFAULT_CONFIG_FILE), "{ not json")
            .expect("failed to write config");
        assert_eq!(ResolverConfig::discover(temp.path()), ResolverConfig::default());
    }

    #[test]
    fn partial_files_keep_remaining_defaults() {
        let temp = tempdir().expect("failed to create temp dir");
        let path = temp.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, r#"{"explore_dir": "/atlas/", "rescan_delays_ms": [10]}"#)
            .expect("failed to write config");

        let layout = ResolverConfig::discover(temp.path()).into_layout();
        assert_eq!(layout.explore_dir, "atlas");
        assert_eq!(layout.game_dir, "game");
        assert_eq!(layout.rescan_delays, vec![Duration::from_millis(10)]);
    }

    #[test]
    fn from_path_reports_missing_files() {
        let temp = tempdir().expect("failed to create temp dir");
        let err = ResolverConfig::from_path(&temp.path().join("missing.json"))
            .expect_err("missing file should fail");
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("missing.json"));
    }
}
