//! Core data type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::PathBuf;

/// On-disk layout of a repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryKind {
    /// Only metadata and objects, no checked-out files
    Bare,
    /// Checked-out files with a metadata subdirectory alongside
    Worktree,
}

impl RepositoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepositoryKind::Bare => "bare",
            RepositoryKind::Worktree => "worktree",
        }
    }
}

/// Result of probing a candidate repository path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Bare,
    Worktree,
    Invalid,
}

impl Classification {
    pub fn kind(&self) -> Option<RepositoryKind> {
        match self {
            Classification::Bare => Some(RepositoryKind::Bare),
            Classification::Worktree => Some(RepositoryKind::Worktree),
            Classification::Invalid => None,
        }
    }
}

/// Metadata of a single commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub author: String,
    #[serde(rename = "date")]
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// A resolved repository
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub group: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RepositoryKind,
    pub path: PathBuf,
    pub clone_url: String,
    pub last_commit: Option<CommitInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    #[serde(rename = "dir")]
    Directory,
    File,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeEntry {
    pub name: String,
    /// Path relative to the repository root
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

impl TreeEntry {
    /// Directories first, then case-insensitive name
    pub fn listing_order(a: &TreeEntry, b: &TreeEntry) -> Ordering {
        match (a.kind, b.kind) {
            (EntryKind::Directory, EntryKind::File) => Ordering::Less,
            (EntryKind::File, EntryKind::Directory) => Ordering::Greater,
            _ => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        }
    }
}

/// Contents of a file at head
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobResult {
    pub is_binary: bool,
    /// Empty when `is_binary` is set
    pub content: String,
}

impl BlobResult {
    pub fn binary() -> Self {
        Self {
            is_binary: true,
            content: String::new(),
        }
    }

    pub fn text(content: String) -> Self {
        Self {
            is_binary: false,
            content,
        }
    }
}

/// Everything shown on a repository's landing page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryDetails {
    pub repository: Repository,
    pub files: Vec<TreeEntry>,
    pub branches: Vec<String>,
    pub tags: Vec<String>,
}
