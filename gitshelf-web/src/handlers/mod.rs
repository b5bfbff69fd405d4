//! HTTP request handlers, organized by resource

pub mod directory;
pub mod file;
pub mod groups;
pub mod health;
pub mod repository;
pub mod types;

pub use directory::*;
pub use file::*;
pub use groups::*;
pub use health::*;
pub use repository::*;
pub use types::*;

use axum::http::Uri;

/// The still percent-encoded part of the request path after `prefix`.
/// Extracted path parameters are already decoded and cannot be used where a
/// `%2F` has to stay distinguishable from a separator.
pub(crate) fn raw_tail<'a>(uri: &'a Uri, prefix: &str) -> &'a str {
    let path = uri.path();
    path.strip_prefix(prefix).unwrap_or_default()
}
