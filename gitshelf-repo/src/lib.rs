//! gitshelf repo - repository resolution and browsing
//!
//! Locates repositories in the store, reads trees, blobs and history through
//! the system `git` binary, and creates or quarantines repositories.

pub mod blob;
pub mod catalog;
pub mod commit;
pub mod containment;
pub mod engine;
pub mod git;
pub mod lifecycle;
pub mod locator;
pub mod path_codec;
pub mod tree;

pub use blob::BlobReader;
pub use catalog::GroupCatalog;
pub use commit::CommitMetadataReader;
pub use containment::resolve_within;
pub use engine::RepositoryEngine;
pub use git::{GitClient, GitEnv, GitOutput, GitRunner, SystemGit};
pub use lifecycle::{QuarantineOutcome, RepositoryLifecycle};
pub use locator::RepositoryLocator;
pub use path_codec::RepositoryPath;
pub use tree::TreeReader;
