//! History queries: last commit, commit count, branches and tags
//!
//! Every query here recovers from failure into an empty value. A repository
//! without commits, or a path that was never touched, is a normal state.

use crate::git::GitClient;
use chrono::{DateTime, Utc};
use gitshelf_core::{CommitInfo, Repository, ShelfResult};
use tracing::debug;

const LOG_FORMAT: &str = "--format=%an|%at|%s";

/// Parse one `author|epoch-seconds|subject` line. The subject may itself
/// contain `|`.
pub fn parse_commit_line(line: &str) -> Option<CommitInfo> {
    let mut parts = line.trim().splitn(3, '|');
    let author = parts.next()?;
    let epoch: i64 = parts.next()?.trim().parse().ok()?;
    let message = parts.next()?;

    Some(CommitInfo {
        author: author.to_string(),
        timestamp: DateTime::<Utc>::from_timestamp(epoch, 0)?,
        message: message.to_string(),
    })
}

/// Parse `git branch --list` / `git tag --list` output
pub fn parse_ref_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.strip_prefix("* ").unwrap_or(line).to_string())
        .collect()
}

#[derive(Debug, Clone)]
pub struct CommitMetadataReader {
    git: GitClient,
}

impl CommitMetadataReader {
    pub fn new(git: GitClient) -> Self {
        Self { git }
    }

    /// Last commit at head touching `path`, or the overall last commit when
    /// `path` is empty. `path` is matched literally, never as a glob.
    pub async fn last_commit(&self, repo: &Repository, path: &str) -> Option<CommitInfo> {
        let mut args = vec!["--literal-pathspecs", "log", "-1", LOG_FORMAT, "HEAD"];
        if !path.is_empty() {
            args.push("--");
            args.push(path);
        }

        let output = match self.git.run_in(repo, &args).await {
            Ok(output) if output.success => output,
            Ok(output) => {
                debug!(repo = %repo.name, path = %path, stderr = %output.stderr, "no commit information");
                return None;
            }
            Err(e) => {
                debug!(repo = %repo.name, path = %path, error = %e, "no commit information");
                return None;
            }
        };

        parse_commit_line(&output.stdout_trimmed())
    }

    /// Number of commits reachable from head; 0 when head does not resolve.
    /// A git that cannot be run is an error, not an empty history.
    pub async fn head_commit_count(&self, repo: &Repository) -> ShelfResult<u64> {
        let output = self.git.run_in(repo, &["rev-list", "--count", "HEAD"]).await?;
        if !output.success {
            return Ok(0);
        }
        Ok(output.stdout_trimmed().parse().unwrap_or(0))
    }

    pub async fn branches(&self, repo: &Repository) -> Vec<String> {
        self.ref_list(repo, "branch").await
    }

    pub async fn tags(&self, repo: &Repository) -> Vec<String> {
        self.ref_list(repo, "tag").await
    }

    async fn ref_list(&self, repo: &Repository, subcommand: &str) -> Vec<String> {
        match self.git.run_in(repo, &[subcommand, "--list"]).await {
            Ok(output) if output.success => {
                parse_ref_list(&String::from_utf8_lossy(&output.stdout))
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commit_line() {
        let info = parse_commit_line("Ada Lovelace|1700000000|Add README\n").unwrap();
        assert_eq!(info.author, "Ada Lovelace");
        assert_eq!(info.timestamp.timestamp(), 1_700_000_000);
        assert_eq!(info.message, "Add README");
    }

    #[test]
    fn test_parse_commit_line_with_pipe_in_subject() {
        let info = parse_commit_line("dev|1700000000|fix a|b parsing").unwrap();
        assert_eq!(info.message, "fix a|b parsing");
    }

    #[test]
    fn test_parse_commit_line_rejects_garbage() {
        assert!(parse_commit_line("").is_none());
        assert!(parse_commit_line("dev|yesterday|msg").is_none());
        assert!(parse_commit_line("dev|1700000000").is_none());
    }

    #[test]
    fn test_parse_ref_list() {
        let refs = parse_ref_list("  develop\n* main\n\n  release/1.0\n");
        assert_eq!(refs, vec!["develop", "main", "release/1.0"]);
    }
}
