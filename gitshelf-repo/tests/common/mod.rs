//! Shared fixtures for tests that drive the real `git` binary

#![allow(dead_code)]

use async_trait::async_trait;
use gitshelf_core::{ShelfConfig, ShelfResult};
use gitshelf_repo::{GitEnv, GitOutput, GitRunner, RepositoryEngine, SystemGit};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Whether a usable `git` is on PATH; tests return early without one
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run git synchronously and panic with its stderr on failure
pub fn git(dir: &Path, args: &[&str]) -> String {
    git_with_env(dir, args, &[])
}

pub fn git_with_env(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .args([
            "-c",
            "user.name=Shelf Tester",
            "-c",
            "user.email=tester@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .envs(env.iter().copied())
        .output()
        .expect("git should run");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A store root in a temporary directory with helpers to populate it
pub struct Store {
    pub dir: TempDir,
}

impl Store {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("git")).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config(&self) -> ShelfConfig {
        ShelfConfig::with_store_root(self.root())
    }

    pub fn engine(&self) -> RepositoryEngine {
        RepositoryEngine::new(self.config())
    }

    pub fn recording_engine(&self) -> (RepositoryEngine, Arc<RecordingGit>) {
        let runner = Arc::new(RecordingGit::default());
        (RepositoryEngine::with_runner(self.config(), runner.clone()), runner)
    }

    pub fn repo_path(&self, group: &str, name: &str) -> PathBuf {
        self.root().join(group).join(format!("{}.git", name))
    }

    /// An empty bare repository at `<group>/<name>.git`
    pub fn bare(&self, group: &str, name: &str) -> PathBuf {
        let path = self.repo_path(group, name);
        std::fs::create_dir_all(&path).unwrap();
        git(&path, &["init", "--bare", "--quiet"]);
        path
    }

    /// A bare repository holding one commit with `files`, authored at
    /// `epoch` seconds
    pub fn bare_with_files(
        &self,
        group: &str,
        name: &str,
        files: &[(&str, &[u8])],
        epoch: i64,
    ) -> PathBuf {
        self.bare_with_history(group, name, &[(files, epoch)])
    }

    /// A bare repository with one commit per `(files, epoch)` step, oldest
    /// first. Each step writes its files over the previous tree.
    pub fn bare_with_history(
        &self,
        group: &str,
        name: &str,
        steps: &[(&[(&str, &[u8])], i64)],
    ) -> PathBuf {
        let bare = self.bare(group, name);
        let work = tempfile::tempdir().unwrap();
        git(work.path(), &["init", "--quiet"]);
        for (step, (files, epoch)) in steps.iter().enumerate() {
            let message = if step == 0 {
                "Initial import".to_string()
            } else {
                format!("Change {}", step)
            };
            add_commit(work.path(), files, *epoch, &message);
        }

        let head_ref = git(&bare, &["symbolic-ref", "HEAD"]);
        let bare_str = bare.to_string_lossy().into_owned();
        git(
            work.path(),
            &["push", "--quiet", &bare_str, &format!("HEAD:{}", head_ref)],
        );
        bare
    }

    /// A non-bare repository at `<group>/<name>.git` with `files` committed
    pub fn worktree_with_files(
        &self,
        group: &str,
        name: &str,
        files: &[(&str, &[u8])],
        epoch: i64,
    ) -> PathBuf {
        let path = self.repo_path(group, name);
        std::fs::create_dir_all(&path).unwrap();
        commit_files(&path, files, epoch);
        path
    }
}

/// `git init` in `dir`, write `files` and commit them
pub fn commit_files(dir: &Path, files: &[(&str, &[u8])], epoch: i64) {
    git(dir, &["init", "--quiet"]);
    add_commit(dir, files, epoch, "Initial import");
}

/// Write `files` into an initialized `dir` and commit them at `epoch`
pub fn add_commit(dir: &Path, files: &[(&str, &[u8])], epoch: i64, message: &str) {
    for (path, content) in files {
        let target = dir.join(path);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(target, content).unwrap();
    }
    git(dir, &["add", "--all"]);

    let date = format!("{} +0000", epoch);
    git_with_env(
        dir,
        &["commit", "--quiet", "-m", message],
        &[("GIT_AUTHOR_DATE", &date), ("GIT_COMMITTER_DATE", &date)],
    );
}

/// Delegates to the system git and keeps every argument vector
#[derive(Debug, Default)]
pub struct RecordingGit {
    calls: Mutex<Vec<Vec<OsString>>>,
}

impl RecordingGit {
    pub fn calls(&self) -> Vec<Vec<OsString>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GitRunner for RecordingGit {
    async fn run(&self, args: Vec<OsString>, env: GitEnv) -> ShelfResult<GitOutput> {
        self.calls.lock().unwrap().push(args.clone());
        SystemGit::new("git").run(args, env).await
    }
}

#[cfg(unix)]
pub fn mode_of(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    std::fs::symlink_metadata(path).unwrap().permissions().mode() & 0o777
}

/// Give a quarantined directory its permissions back so the temp dir can be
/// removed
#[cfg(unix)]
pub fn unlock(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    let _ = std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700));
}
