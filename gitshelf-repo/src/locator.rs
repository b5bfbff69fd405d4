//! Resolution of `(group, name)` to an on-disk repository

use gitshelf_core::{
    is_valid_name, not_found_error, Classification, ErrorContext, Repository, ShelfConfig,
    ShelfError, ShelfResult,
};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const COMPONENT: &str = "repository_locator";

#[derive(Debug, Clone)]
pub struct RepositoryLocator {
    config: Arc<ShelfConfig>,
}

impl RepositoryLocator {
    pub fn new(config: Arc<ShelfConfig>) -> Self {
        Self { config }
    }

    /// Inspect `path` once. A metadata subdirectory wins over a head marker, so
    /// exactly one classification holds for any path.
    pub fn classify(&self, path: &Path) -> Classification {
        if path.join(&self.config.metadata_dir).exists() {
            Classification::Worktree
        } else if path.join(&self.config.head_marker).is_file() {
            Classification::Bare
        } else {
            Classification::Invalid
        }
    }

    /// Resolve an active repository. The returned value has no commit
    /// information attached.
    pub fn locate(&self, group: &str, name: &str) -> ShelfResult<Repository> {
        if !is_valid_name(group) || self.config.is_reserved(group) || !is_valid_name(name) {
            return Err(not_found_error!(format!("{}/{}", group, name), COMPONENT));
        }

        let path = self.config.repository_path(group, name);
        if !path.is_dir() {
            return Err(not_found_error!(format!("{}/{}", group, name), COMPONENT));
        }

        let kind = self.classify(&path).kind().ok_or_else(|| ShelfError::NotInitialized {
            path: format!("{}/{}", group, name),
            context: ErrorContext::new(COMPONENT)
                .with_operation("locate")
                .with_suggestion("Initialize the directory as a bare repository"),
        })?;

        debug!(group = %group, name = %name, kind = kind.as_str(), "repository located");

        Ok(Repository {
            group: group.to_string(),
            name: name.to_string(),
            kind,
            clone_url: self.config.clone_url(group, name),
            path,
            last_commit: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitshelf_core::RepositoryKind;
    use std::fs;

    fn setup() -> (tempfile::TempDir, RepositoryLocator) {
        let dir = tempfile::tempdir().unwrap();
        let config = ShelfConfig::with_store_root(dir.path());
        (dir, RepositoryLocator::new(Arc::new(config)))
    }

    #[test]
    fn test_classify_bare() {
        let (dir, locator) = setup();
        let repo = dir.path().join("git/proj.git");
        fs::create_dir_all(&repo).unwrap();
        fs::write(repo.join("HEAD"), "ref: refs/heads/main\n").unwrap();

        assert_eq!(locator.classify(&repo), Classification::Bare);
        let located = locator.locate("git", "proj").unwrap();
        assert_eq!(located.kind, RepositoryKind::Bare);
        assert_eq!(located.clone_url, "git@localhost:git/proj.git");
    }

    #[test]
    fn test_classify_worktree_wins_over_marker() {
        let (dir, locator) = setup();
        let repo = dir.path().join("git/work.git");
        fs::create_dir_all(repo.join(".git")).unwrap();
        fs::write(repo.join("HEAD"), "not really a marker").unwrap();

        assert_eq!(locator.classify(&repo), Classification::Worktree);
        assert_eq!(
            locator.locate("git", "work").unwrap().kind,
            RepositoryKind::Worktree
        );
    }

    #[test]
    fn test_not_initialized() {
        let (dir, locator) = setup();
        fs::create_dir_all(dir.path().join("git/empty.git")).unwrap();

        assert!(matches!(
            locator.locate("git", "empty"),
            Err(ShelfError::NotInitialized { .. })
        ));
    }

    #[test]
    fn test_not_found() {
        let (_dir, locator) = setup();
        assert!(matches!(
            locator.locate("git", "missing"),
            Err(ShelfError::NotFound { .. })
        ));
        assert!(matches!(
            locator.locate("..", "etc"),
            Err(ShelfError::NotFound { .. })
        ));
        assert!(matches!(
            locator.locate("git-shell-commands", "proj"),
            Err(ShelfError::NotFound { .. })
        ));
    }
}
