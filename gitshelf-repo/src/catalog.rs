//! Discovery of groups and of the repository directories inside a group
//!
//! Scans happen on every call; nothing is cached between requests.

use gitshelf_core::{is_valid_name, not_found_error, ErrorContext, ShelfConfig, ShelfError, ShelfResult};
use std::fs::Metadata;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

const COMPONENT: &str = "group_catalog";

#[cfg(unix)]
fn is_readable(metadata: &Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o444 != 0
}

#[cfg(not(unix))]
fn is_readable(_metadata: &Metadata) -> bool {
    true
}

/// Metadata of `path`, following one level of symbolic link. `None` when the
/// link is dangling or unreadable.
async fn resolved_metadata(path: &Path, file_type: std::fs::FileType) -> Option<Metadata> {
    if file_type.is_symlink() {
        tokio::fs::metadata(path).await.ok()
    } else {
        tokio::fs::symlink_metadata(path).await.ok()
    }
}

#[derive(Debug, Clone)]
pub struct GroupCatalog {
    config: Arc<ShelfConfig>,
}

impl GroupCatalog {
    pub fn new(config: Arc<ShelfConfig>) -> Self {
        Self { config }
    }

    /// Whether `group` could ever be listed
    pub fn is_listable(&self, group: &str) -> bool {
        is_valid_name(group) && !self.config.is_reserved(group)
    }

    /// Group names under the store root, ascending. The default group is
    /// always included.
    pub async fn list_groups(&self) -> ShelfResult<Vec<String>> {
        let root = &self.config.store_root;
        let mut entries = tokio::fs::read_dir(root)
            .await
            .map_err(|e| catalog_unavailable(root, e))?;

        let mut groups = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| catalog_unavailable(root, e))?
        {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if !self.is_listable(&name) {
                continue;
            }

            let Ok(file_type) = entry.file_type().await else {
                continue;
            };
            let Some(metadata) = resolved_metadata(&entry.path(), file_type).await else {
                debug!(group = %name, "skipping unreadable link");
                continue;
            };
            if !metadata.is_dir() || !is_readable(&metadata) {
                continue;
            }

            groups.push(name);
        }

        if !groups.contains(&self.config.default_group) {
            groups.push(self.config.default_group.clone());
        }
        groups.sort();

        debug!(count = groups.len(), "groups listed");
        Ok(groups)
    }

    /// Names of the active repository directories in `group`, with the bare
    /// suffix removed. Quarantined and unreadable entries are left out; a
    /// failure on one entry does not abort the scan.
    pub async fn repository_names(&self, group: &str) -> ShelfResult<Vec<String>> {
        if !self.is_listable(group) {
            return Err(not_found_error!(format!("group {}", group), COMPONENT));
        }

        let group_path = self.config.group_path(group);
        let mut entries = match tokio::fs::read_dir(&group_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if group == self.config.default_group {
                    return Ok(Vec::new());
                }
                return Err(not_found_error!(format!("group {}", group), COMPONENT));
            }
            Err(e) => return Err(catalog_unavailable(&group_path, e)),
        };

        let mut names = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!(group = %group, error = %e, "repository scan stopped early");
                    break;
                }
            };

            let dir_name = entry.file_name();
            let Some(dir_name) = dir_name.to_str() else {
                continue;
            };
            let Some(name) = self.config.strip_bare_suffix(dir_name) else {
                continue;
            };
            if !is_valid_name(name) {
                continue;
            }

            let Ok(file_type) = entry.file_type().await else {
                continue;
            };
            match resolved_metadata(&entry.path(), file_type).await {
                Some(metadata) if metadata.is_dir() && is_readable(&metadata) => {
                    names.push(name.to_string());
                }
                _ => continue,
            }
        }

        Ok(names)
    }
}

fn catalog_unavailable(path: &Path, e: std::io::Error) -> ShelfError {
    ShelfError::CatalogUnavailable {
        message: format!("Failed to read {}: {}", path.display(), e),
        source: Some(Box::new(e)),
        context: ErrorContext::new(COMPONENT)
            .with_operation("scan")
            .with_suggestion("Check that the store root exists and is readable"),
    }
}
