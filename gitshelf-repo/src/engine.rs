//! The operations offered to the HTTP layer
//!
//! `RepositoryEngine` wires the catalog, locator, readers and lifecycle to a
//! single configuration and git runner. It holds no state of its own; every
//! call reads the filesystem and the repositories afresh.
//!
//! A repository that is quarantined while a read is in flight is reported as
//! not found by that read once its subprocess fails.

use crate::blob::BlobReader;
use crate::catalog::GroupCatalog;
use crate::commit::CommitMetadataReader;
use crate::git::{GitClient, GitRunner, SystemGit};
use crate::lifecycle::{QuarantineOutcome, RepositoryLifecycle};
use crate::locator::RepositoryLocator;
use crate::tree::TreeReader;
use gitshelf_core::{
    BlobResult, Repository, RepositoryDetails, ShelfConfig, ShelfResult, TreeEntry,
};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
pub struct RepositoryEngine {
    config: Arc<ShelfConfig>,
    catalog: GroupCatalog,
    locator: RepositoryLocator,
    commits: CommitMetadataReader,
    tree: TreeReader,
    blob: BlobReader,
    lifecycle: RepositoryLifecycle,
}

/// Newest last commit first; repositories without commit information last
fn by_last_commit_desc(a: &Repository, b: &Repository) -> Ordering {
    match (&a.last_commit, &b.last_commit) {
        (Some(a), Some(b)) => b.timestamp.cmp(&a.timestamp),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

impl RepositoryEngine {
    /// Engine that runs the configured git binary
    pub fn new(config: ShelfConfig) -> Self {
        let runner = Arc::new(SystemGit::new(config.git_binary.clone()));
        Self::with_runner(config, runner)
    }

    /// Engine with a custom git runner
    pub fn with_runner(config: ShelfConfig, runner: Arc<dyn GitRunner>) -> Self {
        let config = Arc::new(config);
        let git = GitClient::new(runner);
        let commits = CommitMetadataReader::new(git.clone());

        Self {
            catalog: GroupCatalog::new(config.clone()),
            locator: RepositoryLocator::new(config.clone()),
            tree: TreeReader::new(git.clone(), commits.clone()),
            blob: BlobReader::new(git.clone()),
            lifecycle: RepositoryLifecycle::new(config.clone(), git),
            commits,
            config,
        }
    }

    pub fn config(&self) -> &ShelfConfig {
        &self.config
    }

    pub async fn list_groups(&self) -> ShelfResult<Vec<String>> {
        self.catalog.list_groups().await
    }

    /// Repositories of `group`, newest commit first
    #[instrument(skip(self))]
    pub async fn list_repositories(&self, group: &str) -> ShelfResult<Vec<Repository>> {
        let names = self.catalog.repository_names(group).await?;

        let mut repositories = Vec::with_capacity(names.len());
        for name in names {
            let mut repo = match self.locator.locate(group, &name) {
                Ok(repo) => repo,
                Err(e) => {
                    debug!(name = %name, error = %e, "skipping entry");
                    continue;
                }
            };
            repo.last_commit = self.commits.last_commit(&repo, "").await;
            repositories.push(repo);
        }

        repositories.sort_by(by_last_commit_desc);
        Ok(repositories)
    }

    /// Resolve `group/name` without reading any history
    pub fn locate(&self, group: &str, name: &str) -> ShelfResult<Repository> {
        self.locator.locate(group, name)
    }

    #[instrument(skip(self))]
    pub async fn get_repository_details(
        &self,
        group: &str,
        name: &str,
    ) -> ShelfResult<RepositoryDetails> {
        let mut repository = self.locator.locate(group, name)?;
        repository.last_commit = self.commits.last_commit(&repository, "").await;

        let files = self.tree.list(&repository, "").await?;
        let branches = self.commits.branches(&repository).await;
        let tags = self.commits.tags(&repository).await;

        Ok(RepositoryDetails {
            repository,
            files,
            branches,
            tags,
        })
    }

    pub async fn list_directory(
        &self,
        group: &str,
        name: &str,
        path: &str,
    ) -> ShelfResult<Vec<TreeEntry>> {
        let repository = self.locator.locate(group, name)?;
        self.tree.list(&repository, path).await
    }

    pub async fn read_file(&self, group: &str, name: &str, path: &str) -> ShelfResult<BlobResult> {
        let repository = self.locator.locate(group, name)?;
        self.blob.read(&repository, path).await
    }

    pub async fn create_repository(&self, group: &str, name: &str) -> ShelfResult<Repository> {
        self.lifecycle.create(group, name).await
    }

    pub async fn delete_repository(&self, group: &str, name: &str) -> ShelfResult<()> {
        match self.lifecycle.quarantine(group, name).await? {
            QuarantineOutcome::Quarantined(path) => {
                info!(group = %group, name = %name, path = %path.display(), "repository deleted");
            }
            QuarantineOutcome::AlreadyQuarantined(_) => {
                debug!(group = %group, name = %name, "repository was already deleted");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::test_support::UnavailableGit;
    use chrono::{TimeZone, Utc};
    use gitshelf_core::ShelfError;
    use gitshelf_core::{CommitInfo, RepositoryKind};
    use std::path::PathBuf;

    fn repo(name: &str, epoch: Option<i64>) -> Repository {
        Repository {
            group: "git".to_string(),
            name: name.to_string(),
            kind: RepositoryKind::Bare,
            path: PathBuf::from(name),
            clone_url: String::new(),
            last_commit: epoch.map(|secs| CommitInfo {
                author: "dev".to_string(),
                timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
                message: "msg".to_string(),
            }),
        }
    }

    #[test]
    fn test_repository_order() {
        let mut repos = vec![
            repo("never", None),
            repo("old", Some(1_000)),
            repo("new", Some(2_000)),
        ];
        repos.sort_by(by_last_commit_desc);

        let names: Vec<&str> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["new", "old", "never"]);
    }

    #[tokio::test]
    async fn test_git_failure_is_not_an_empty_listing() {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().join("git/proj.git");
        std::fs::create_dir_all(&repo).unwrap();
        std::fs::write(repo.join("HEAD"), "ref: refs/heads/main\n").unwrap();

        let config = ShelfConfig::with_store_root(dir.path());
        let engine = RepositoryEngine::with_runner(config, Arc::new(UnavailableGit));

        let listing = engine.list_directory("git", "proj", "").await;
        assert!(matches!(listing, Err(ShelfError::Git { .. })), "{:?}", listing);

        let details = engine.get_repository_details("git", "proj").await;
        assert!(matches!(details, Err(ShelfError::Git { .. })));
    }
}
