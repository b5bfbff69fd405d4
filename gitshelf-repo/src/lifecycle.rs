//! Creation and quarantine of repositories
//!
//! Repositories are never erased. Quarantine renames the directory with the
//! quarantine suffix and revokes all permissions on it; there is no way back.

use crate::git::GitClient;
use gitshelf_core::{
    is_valid_name, lifecycle_error, not_found_error, validation_error, Repository,
    RepositoryKind, ShelfConfig, ShelfError, ShelfResult,
};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

const COMPONENT: &str = "repository_lifecycle";

#[cfg(unix)]
async fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await
}

#[cfg(not(unix))]
async fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    let mut permissions = tokio::fs::metadata(path).await?.permissions();
    permissions.set_readonly(mode & 0o200 == 0);
    tokio::fs::set_permissions(path, permissions).await
}

async fn path_present(path: &Path) -> bool {
    tokio::fs::symlink_metadata(path).await.is_ok()
}

/// Outcome of a quarantine request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuarantineOutcome {
    /// The active repository was moved to this path
    Quarantined(PathBuf),
    /// Nothing active remained; an earlier quarantine already holds the name
    AlreadyQuarantined(PathBuf),
}

#[derive(Debug, Clone)]
pub struct RepositoryLifecycle {
    config: Arc<ShelfConfig>,
    git: GitClient,
}

impl RepositoryLifecycle {
    pub fn new(config: Arc<ShelfConfig>, git: GitClient) -> Self {
        Self { config, git }
    }

    /// Check a requested name and return the path the repository would use
    pub async fn validate_new(&self, group: &str, name: &str) -> ShelfResult<PathBuf> {
        if !is_valid_name(group) || self.config.is_reserved(group) {
            return Err(validation_error!(
                format!("'{}' is not a valid group", group),
                "group",
                COMPONENT
            ));
        }
        if name.is_empty() {
            return Err(validation_error!("Repository name is required", "name", COMPONENT));
        }
        if !is_valid_name(name) {
            return Err(validation_error!(
                "Repository names may only contain letters, digits, '-' and '_'",
                "name",
                COMPONENT
            ));
        }

        let path = self.config.repository_path(group, name);
        if path_present(&path).await {
            return Err(name_taken(name));
        }
        Ok(path)
    }

    /// Create the repository directory itself. Exactly one of several
    /// concurrent callers succeeds; the rest see the name as taken.
    async fn claim_directory(&self, group: &str, name: &str, path: &Path) -> ShelfResult<()> {
        tokio::fs::create_dir_all(self.config.group_path(group))
            .await
            .map_err(|e| {
                lifecycle_error!(format!("Failed to create group directory: {}", e), COMPONENT, e)
            })?;

        match tokio::fs::create_dir(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Err(name_taken(name)),
            Err(e) => Err(lifecycle_error!(
                format!("Failed to create directory: {}", e),
                COMPONENT,
                e
            )),
        }
    }

    /// Create an empty bare repository. If init fails, the directory this
    /// call created is removed on a best-effort basis.
    #[instrument(skip(self))]
    pub async fn create(&self, group: &str, name: &str) -> ShelfResult<Repository> {
        let path = self.validate_new(group, name).await?;
        self.claim_directory(group, name, &path).await?;

        let args = vec![
            OsString::from("init"),
            OsString::from("--bare"),
            path.clone().into_os_string(),
        ];
        let failure = match self.git.run(args).await {
            Ok(output) if output.success => None,
            Ok(output) => Some(output.stderr),
            Err(e) => Some(e.to_string()),
        };

        if let Some(reason) = failure {
            if let Err(cleanup) = tokio::fs::remove_dir_all(&path).await {
                warn!(path = %path.display(), error = %cleanup, "cleanup after failed init did not complete");
            }
            return Err(lifecycle_error!(
                format!("Failed to initialize repository: {}", reason),
                COMPONENT
            ));
        }

        info!(path = %path.display(), "repository created");
        Ok(Repository {
            group: group.to_string(),
            name: name.to_string(),
            kind: RepositoryKind::Bare,
            clone_url: self.config.clone_url(group, name),
            path,
            last_commit: None,
        })
    }

    /// Move `group/name` into quarantine. A previous quarantine under the
    /// same name is erased first. Calling this again after success is a
    /// no-op.
    #[instrument(skip(self))]
    pub async fn quarantine(&self, group: &str, name: &str) -> ShelfResult<QuarantineOutcome> {
        let name = self.config.strip_bare_suffix(name).unwrap_or(name);
        if !is_valid_name(group) || self.config.is_reserved(group) || !is_valid_name(name) {
            return Err(not_found_error!(format!("{}/{}", group, name), COMPONENT));
        }

        let active = self.config.repository_path(group, name);
        let quarantine = self.config.quarantine_path(group, name);

        if !path_present(&active).await {
            if path_present(&quarantine).await {
                return Ok(QuarantineOutcome::AlreadyQuarantined(quarantine));
            }
            return Err(not_found_error!(format!("{}/{}", group, name), COMPONENT));
        }

        if path_present(&quarantine).await {
            self.remove_previous(&quarantine).await?;
        }

        tokio::fs::rename(&active, &quarantine).await.map_err(|e| {
            lifecycle_error!(format!("Failed to move repository into quarantine: {}", e), COMPONENT, e)
        })?;

        if let Err(e) = set_mode(&quarantine, 0o000).await {
            warn!(path = %quarantine.display(), error = %e, "failed to revoke permissions on quarantined repository");
        }

        info!(path = %quarantine.display(), "repository quarantined");
        Ok(QuarantineOutcome::Quarantined(quarantine))
    }

    async fn remove_previous(&self, quarantine: &Path) -> ShelfResult<()> {
        if let Err(e) = set_mode(quarantine, 0o700).await {
            warn!(path = %quarantine.display(), error = %e, "failed to restore permissions before removal");
        }
        tokio::fs::remove_dir_all(quarantine).await.map_err(|e| {
            lifecycle_error!(
                format!("Failed to remove previously quarantined repository: {}", e),
                COMPONENT,
                e
            )
        })
    }
}

fn name_taken(name: &str) -> ShelfError {
    validation_error!(
        format!("Repository '{}' already exists", name),
        "name",
        COMPONENT
    )
}
