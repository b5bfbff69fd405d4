//! File contents at head
//!
//! Attributes are evaluated against the head tree, not against a working
//! tree or `info/attributes` alone. Head is read into a throwaway index and
//! `check-attr --cached` consults the `.gitattributes` files recorded there.

use crate::containment::resolve_within;
use crate::git::{GitClient, GitEnv, GitOutput};
use gitshelf_core::{not_found_error, BlobResult, ErrorContext, Repository, ShelfError, ShelfResult};
use tracing::{debug, instrument};

const COMPONENT: &str = "blob_reader";

/// Whether `git check-attr binary` output reports the attribute as set
pub fn binary_attribute_set(check_attr_output: &str) -> bool {
    check_attr_output
        .lines()
        .any(|line| line.trim_end().ends_with(": binary: set"))
}

#[derive(Debug, Clone)]
pub struct BlobReader {
    git: GitClient,
}

impl BlobReader {
    pub fn new(git: GitClient) -> Self {
        Self { git }
    }

    /// Read `file_path` at head. Paths carrying the `binary` attribute are
    /// reported as binary without reading the blob; so is content that is not
    /// valid UTF-8.
    #[instrument(skip(self, repo), fields(group = %repo.group, repo = %repo.name))]
    pub async fn read(&self, repo: &Repository, file_path: &str) -> ShelfResult<BlobResult> {
        let path = resolve_within(&repo.path, file_path)?;
        if path.is_empty() {
            return Err(content_unavailable(file_path, "no file path given".to_string()));
        }

        if self.binary_at_head(repo, &path).await? {
            debug!(path = %path, "binary attribute set");
            return Ok(BlobResult::binary());
        }

        let blob_spec = format!("HEAD:{}", path);
        let content = self
            .git
            .run_in(repo, &["cat-file", "blob", &blob_spec])
            .await?;
        if !content.success {
            return Err(read_failure(repo, &path, "cat-file", &content));
        }

        match String::from_utf8(content.stdout) {
            Ok(text) => Ok(BlobResult::text(text)),
            Err(_) => {
                debug!(path = %path, "content is not UTF-8");
                Ok(BlobResult::binary())
            }
        }
    }

    /// Whether `path` carries the `binary` attribute in the head tree
    async fn binary_at_head(&self, repo: &Repository, path: &str) -> ShelfResult<bool> {
        let scratch = tempfile::tempdir()?;
        let env: GitEnv = vec![(
            "GIT_INDEX_FILE".to_string(),
            scratch.path().join("index").into_os_string(),
        )];

        let index = self
            .git
            .run_in_with_env(repo, &["read-tree", "HEAD"], env.clone())
            .await?;
        if !index.success {
            return Err(read_failure(repo, path, "read-tree", &index));
        }

        let attributes = self
            .git
            .run_in_with_env(repo, &["check-attr", "--cached", "binary", "--", path], env)
            .await?;
        if !attributes.success {
            return Err(read_failure(repo, path, "check-attr", &attributes));
        }
        Ok(binary_attribute_set(&String::from_utf8_lossy(&attributes.stdout)))
    }
}

fn content_unavailable(path: &str, message: String) -> ShelfError {
    ShelfError::ContentUnavailable {
        path: path.to_string(),
        message,
        context: ErrorContext::new(COMPONENT)
            .with_operation("read")
            .with_suggestion("Check that the file exists at the head revision"),
    }
}

fn read_failure(repo: &Repository, path: &str, step: &str, output: &GitOutput) -> ShelfError {
    if !repo.path.exists() {
        return not_found_error!(format!("{}/{}", repo.group, repo.name), COMPONENT);
    }
    content_unavailable(path, format!("{} failed: {}", step, output.stderr))
}
