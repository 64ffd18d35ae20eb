//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable overriding the default repository
pub const REPO_ENV: &str = "GH_ISSUE_BULK_REPO";

/// Environment variable overriding the `gh` binary
pub const GH_ENV: &str = "GH_ISSUE_BULK_GH";

/// Tool configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default target repository (owner/name)
    pub repo: Option<String>,

    /// Path or name of the GitHub CLI binary
    pub gh_path: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // User config (~/.config/gh-issue-bulk-create/config.yaml)
        if let Some(path) = Self::global_config_path() {
            if let Some(file) = Self::read_file(&path) {
                config.merge(file);
            }
        }

        config.merge(Self::from_env(|key| std::env::var(key).ok()));
        config
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "gh-issue-bulk-create")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Read one config file; missing or malformed files are skipped
    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read config file");
                return None;
            }
        };

        if contents.trim().is_empty() {
            return Some(Config::default());
        }

        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                None
            }
        }
    }

    /// Build the environment layer from a variable lookup
    fn from_env(lookup: impl Fn(&str) -> Option<String>) -> Config {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Config {
            repo: non_empty(REPO_ENV),
            gh_path: non_empty(GH_ENV),
        }
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.repo.is_some() {
            self.repo = other.repo;
        }
        if other.gh_path.is_some() {
            self.gh_path = other.gh_path;
        }
    }

    /// The `gh` binary to run
    pub fn gh(&self) -> &str {
        self.gh_path.as_deref().unwrap_or("gh")
    }
}
