//! Single-level directory listings at head
//!
//! Cost: a listing of N files runs one `ls-tree`, N `cat-file -s` and N
//! `log -1` invocations, one after the other, so latency grows linearly with
//! the number of entries.

use crate::commit::CommitMetadataReader;
use crate::containment::resolve_within;
use crate::git::{GitClient, GitOutput};
use gitshelf_core::{
    not_found_error, EntryKind, ErrorContext, Repository, ShelfError, ShelfResult, TreeEntry,
};
use tracing::{debug, instrument};

const COMPONENT: &str = "tree_reader";

/// One record of `git ls-tree` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LsTreeRecord {
    pub mode: String,
    pub object_type: String,
    pub object_id: String,
    pub name: String,
}

/// Parse `<mode> <type> <object>\t<name>`. Without a tab the name is every
/// field after the third, rejoined, so names containing whitespace survive.
pub fn parse_ls_tree_record(record: &str) -> Option<LsTreeRecord> {
    let (meta, name) = match record.split_once('\t') {
        Some((meta, name)) => (meta, name.to_string()),
        None => {
            let fields: Vec<&str> = record.split_whitespace().collect();
            if fields.len() < 4 {
                return None;
            }
            let name = fields[3..].join(" ");
            return Some(LsTreeRecord {
                mode: fields[0].to_string(),
                object_type: fields[1].to_string(),
                object_id: fields[2].to_string(),
                name,
            });
        }
    };

    let mut fields = meta.split_whitespace();
    let record = LsTreeRecord {
        mode: fields.next()?.to_string(),
        object_type: fields.next()?.to_string(),
        object_id: fields.next()?.to_string(),
        name,
    };
    if record.name.is_empty() {
        return None;
    }
    Some(record)
}

/// Split `ls-tree -z` output into records
pub fn parse_ls_tree(output: &[u8]) -> Vec<LsTreeRecord> {
    String::from_utf8_lossy(output)
        .split('\0')
        .filter(|record| !record.trim().is_empty())
        .filter_map(parse_ls_tree_record)
        .collect()
}

#[derive(Debug, Clone)]
pub struct TreeReader {
    git: GitClient,
    commits: CommitMetadataReader,
}

impl TreeReader {
    pub fn new(git: GitClient, commits: CommitMetadataReader) -> Self {
        Self { git, commits }
    }

    /// List the entries directly under `relative_path` at head, directories
    /// first. A repository without commits lists as empty.
    #[instrument(skip(self, repo), fields(group = %repo.group, repo = %repo.name))]
    pub async fn list(&self, repo: &Repository, relative_path: &str) -> ShelfResult<Vec<TreeEntry>> {
        let dir = resolve_within(&repo.path, relative_path)?;

        if self.commits.head_commit_count(repo).await? == 0 {
            debug!("repository has no commits");
            return Ok(Vec::new());
        }

        let treeish = if dir.is_empty() {
            "HEAD".to_string()
        } else {
            format!("HEAD:{}", dir)
        };
        let output = self.git.run_in(repo, &["ls-tree", "-z", &treeish]).await?;
        if !output.success {
            return Err(listing_failure(repo, &dir, &output));
        }

        let mut entries = Vec::new();
        for record in parse_ls_tree(&output.stdout) {
            let kind = if record.object_type == "tree" {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            let path = if dir.is_empty() {
                record.name.clone()
            } else {
                format!("{}/{}", dir, record.name)
            };

            let size = if record.object_type == "blob" {
                self.object_size(repo, &record.object_id).await
            } else {
                0
            };
            let last_modified = self
                .commits
                .last_commit(repo, &path)
                .await
                .map(|commit| commit.timestamp);

            entries.push(TreeEntry {
                name: record.name,
                path,
                kind,
                size,
                last_modified,
            });
        }

        entries.sort_by(TreeEntry::listing_order);
        debug!(count = entries.len(), path = %dir, "directory listed");
        Ok(entries)
    }

    async fn object_size(&self, repo: &Repository, object_id: &str) -> u64 {
        match self.git.run_in(repo, &["cat-file", "-s", object_id]).await {
            Ok(output) if output.success => output.stdout_trimmed().parse().unwrap_or(0),
            _ => 0,
        }
    }
}

/// Classify a failed `ls-tree`. A repository that vanished mid-request
/// reports as not found.
fn listing_failure(repo: &Repository, dir: &str, output: &GitOutput) -> ShelfError {
    if !repo.path.exists() {
        return not_found_error!(format!("{}/{}", repo.group, repo.name), COMPONENT);
    }
    if output.stderr.contains("Not a valid object name") || output.stderr.contains("not a tree object")
    {
        return not_found_error!(format!("{}/{}:{}", repo.group, repo.name, dir), COMPONENT);
    }
    ShelfError::Git {
        message: format!("ls-tree failed ({:?}): {}", output.code, output.stderr),
        context: ErrorContext::new(COMPONENT)
            .with_operation("list")
            .with_metadata("path", dir),
    }
}
