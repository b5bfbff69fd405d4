//! Invocation of the system `git` binary
//!
//! All repository queries go through a [`GitRunner`]. The production runner
//! spawns `git` with [`tokio::process::Command`]; nothing here parses object
//! files directly.

use async_trait::async_trait;
use gitshelf_core::{ErrorContext, Repository, RepositoryKind, ShelfError, ShelfResult};
use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::debug;

/// Captured result of one git invocation
#[derive(Debug, Clone)]
pub struct GitOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl GitOutput {
    /// Stdout decoded lossily with surrounding whitespace removed
    pub fn stdout_trimmed(&self) -> String {
        String::from_utf8_lossy(&self.stdout).trim().to_string()
    }
}

/// Extra environment for a single invocation
pub type GitEnv = Vec<(String, OsString)>;

/// Runs git with a complete argument vector
#[async_trait]
pub trait GitRunner: Send + Sync + fmt::Debug {
    async fn run(&self, args: Vec<OsString>, env: GitEnv) -> ShelfResult<GitOutput>;
}

/// Spawns the configured git executable
#[derive(Debug, Clone)]
pub struct SystemGit {
    binary: String,
}

impl SystemGit {
    pub fn new<S: Into<String>>(binary: S) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl GitRunner for SystemGit {
    async fn run(&self, args: Vec<OsString>, env: GitEnv) -> ShelfResult<GitOutput> {
        debug!(binary = %self.binary, args = ?args, "spawning git");

        let output = Command::new(&self.binary)
            .args(&args)
            .env("GIT_TERMINAL_PROMPT", "0")
            .envs(env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ShelfError::Git {
                message: format!("Failed to execute {}: {}", self.binary, e),
                context: ErrorContext::new("git")
                    .with_operation("spawn")
                    .with_suggestion("Ensure git is installed and accessible"),
            })?;

        Ok(GitOutput {
            success: output.status.success(),
            code: output.status.code(),
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Leading arguments that point git at a repository of the given kind
pub fn repository_args(path: &Path, kind: RepositoryKind) -> Vec<OsString> {
    match kind {
        RepositoryKind::Bare => {
            let mut git_dir = OsString::from("--git-dir=");
            git_dir.push(path.as_os_str());
            vec![git_dir]
        }
        RepositoryKind::Worktree => vec![OsString::from("-C"), path.as_os_str().to_os_string()],
    }
}

/// Cheaply cloneable handle shared by the readers
#[derive(Debug, Clone)]
pub struct GitClient {
    runner: Arc<dyn GitRunner>,
}

impl GitClient {
    pub fn new(runner: Arc<dyn GitRunner>) -> Self {
        Self { runner }
    }

    /// Run a subcommand against `repo`, selecting the invocation form from
    /// its kind
    pub async fn run_in(&self, repo: &Repository, args: &[&str]) -> ShelfResult<GitOutput> {
        self.run_in_with_env(repo, args, GitEnv::new()).await
    }

    /// [`GitClient::run_in`] with additional environment variables
    pub async fn run_in_with_env(
        &self,
        repo: &Repository,
        args: &[&str],
        env: GitEnv,
    ) -> ShelfResult<GitOutput> {
        let mut full = repository_args(&repo.path, repo.kind);
        full.extend(args.iter().map(OsString::from));
        self.runner.run(full, env).await
    }

    /// Run a subcommand that is not scoped to an existing repository
    pub async fn run(&self, args: Vec<OsString>) -> ShelfResult<GitOutput> {
        self.runner.run(args, GitEnv::new()).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Runner for which git can never be spawned
    #[derive(Debug, Default)]
    pub(crate) struct UnavailableGit;

    #[async_trait]
    impl GitRunner for UnavailableGit {
        async fn run(&self, _args: Vec<OsString>, _env: GitEnv) -> ShelfResult<GitOutput> {
            Err(ShelfError::Git {
                message: "git is not available".to_string(),
                context: ErrorContext::new("git").with_operation("spawn"),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_repository_args() {
        let path = PathBuf::from("/srv/git/proj.git");
        assert_eq!(
            repository_args(&path, RepositoryKind::Bare),
            vec![OsString::from("--git-dir=/srv/git/proj.git")]
        );
        assert_eq!(
            repository_args(&path, RepositoryKind::Worktree),
            vec![OsString::from("-C"), OsString::from("/srv/git/proj.git")]
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_git_error() {
        let runner = SystemGit::new("/nonexistent/bin/git-for-tests");
        let err = runner
            .run(vec![OsString::from("--version")], GitEnv::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ShelfError::Git { .. }));
    }
}
