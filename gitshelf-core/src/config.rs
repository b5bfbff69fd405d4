//! Store configuration
//!
//! A single `ShelfConfig` value is built at startup and handed to every
//! component; nothing reads configuration from ambient state afterwards.

use crate::error::{ErrorContext, ShelfError, ShelfResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Allowed characters for group and repository names
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("static pattern"));

/// Returns true when `name` only uses alphanumerics, `-` and `_`
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelfConfig {
    /// Directory holding one subdirectory per group
    pub store_root: PathBuf,
    /// Host name used in clone identifiers
    pub host_name: String,
    /// Group that is always listed, even when absent on disk
    pub default_group: String,
    /// Suffix of active repository directories, without the dot
    pub bare_suffix: String,
    /// Suffix appended to quarantined repository directories, without the dot
    pub quarantine_suffix: String,
    /// Metadata subdirectory that marks a worktree repository
    pub metadata_dir: String,
    /// File that marks a bare repository
    pub head_marker: String,
    /// Directory names that are never groups
    pub reserved_names: Vec<String>,
    /// Version-control executable
    pub git_binary: String,
    /// Clone identifier template; `{host}`, `{group}` and `{name}` are substituted
    pub clone_url_template: String,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            store_root: PathBuf::from("/mnt/git"),
            host_name: "localhost".to_string(),
            default_group: "git".to_string(),
            bare_suffix: "git".to_string(),
            quarantine_suffix: "deleted".to_string(),
            metadata_dir: ".git".to_string(),
            head_marker: "HEAD".to_string(),
            reserved_names: vec!["git-shell-commands".to_string()],
            git_binary: "git".to_string(),
            clone_url_template: "git@{host}:{group}/{name}.git".to_string(),
        }
    }
}

impl ShelfConfig {
    /// Default configuration rooted at `store_root`
    pub fn with_store_root<P: AsRef<Path>>(store_root: P) -> Self {
        Self {
            store_root: store_root.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ShelfResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ShelfError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: ShelfConfig = toml::from_str(&content).map_err(|e| ShelfError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Apply `GITSHELF_*` environment overrides on top of `self`
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(root) = std::env::var("GITSHELF_STORE_ROOT") {
            self.store_root = PathBuf::from(root);
        }
        if let Ok(host) = std::env::var("GITSHELF_HOST_NAME") {
            self.host_name = host;
        }
        if let Ok(group) = std::env::var("GITSHELF_DEFAULT_GROUP") {
            self.default_group = group;
        }
        if let Ok(binary) = std::env::var("GITSHELF_GIT_BINARY") {
            self.git_binary = binary;
        }
        self
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn validate(&self) -> ShelfResult<()> {
        if !is_valid_name(&self.default_group) {
            return Err(config_invalid(
                format!("Default group '{}' is not a valid group name", self.default_group),
                "Use only alphanumerics, '-' and '_' in default_group",
            ));
        }

        for (field, suffix) in [
            ("bare_suffix", &self.bare_suffix),
            ("quarantine_suffix", &self.quarantine_suffix),
        ] {
            if suffix.is_empty() || suffix.contains('/') || suffix.starts_with('.') {
                return Err(config_invalid(
                    format!("{} '{}' must be a non-empty name without '/' or leading '.'", field, suffix),
                    "Suffixes are given without the leading dot",
                ));
            }
        }

        if self.git_binary.is_empty() {
            return Err(config_invalid(
                "git_binary must not be empty".to_string(),
                "Set git_binary to the path of the git executable",
            ));
        }

        Ok(())
    }

    /// Whether `name` is excluded from group discovery
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved_names.iter().any(|reserved| reserved == name)
    }

    /// `<store-root>/<group>`
    pub fn group_path(&self, group: &str) -> PathBuf {
        self.store_root.join(group)
    }

    /// `<store-root>/<group>/<name>.<bare-suffix>`
    pub fn repository_path(&self, group: &str, name: &str) -> PathBuf {
        self.group_path(group)
            .join(format!("{}.{}", name, self.bare_suffix))
    }

    /// `<store-root>/<group>/<name>.<bare-suffix>.<quarantine-suffix>`
    pub fn quarantine_path(&self, group: &str, name: &str) -> PathBuf {
        self.group_path(group).join(format!(
            "{}.{}.{}",
            name, self.bare_suffix, self.quarantine_suffix
        ))
    }

    /// Strip a trailing `.<bare-suffix>` from a directory name
    pub fn strip_bare_suffix<'a>(&self, dir_name: &'a str) -> Option<&'a str> {
        dir_name
            .strip_suffix(self.bare_suffix.as_str())
            .and_then(|rest| rest.strip_suffix('.'))
            .filter(|rest| !rest.is_empty())
    }

    pub fn clone_url(&self, group: &str, name: &str) -> String {
        self.clone_url_template
            .replace("{host}", &self.host_name)
            .replace("{group}", group)
            .replace("{name}", name)
    }
}

fn config_invalid(message: String, suggestion: &str) -> ShelfError {
    ShelfError::Config {
        message,
        source: None,
        context: ErrorContext::new("config")
            .with_operation("validate")
            .with_suggestion(suggestion),
    }
}
