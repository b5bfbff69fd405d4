//! Path traversal defense for caller-supplied sub-paths

use gitshelf_core::{not_found_error, ErrorContext, ShelfError, ShelfResult};
use std::path::{Component, Path, PathBuf};

const COMPONENT: &str = "containment";

/// Fold `.` and `..` without touching the filesystem. Sub-paths of a bare
/// repository do not exist on disk, so they cannot be canonicalized.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                normalized.push(component.as_os_str())
            }
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
        }
    }
    normalized
}

/// Resolve `relative` against the canonical form of `root` and return it as a
/// `/`-joined repository-relative path. Fails with `PathEscape` when the
/// result is not inside `root`.
pub fn resolve_within(root: &Path, relative: &str) -> ShelfResult<String> {
    let canonical_root = root
        .canonicalize()
        .map_err(|_| not_found_error!(root.display(), COMPONENT))?;

    let candidate = normalize_lexically(&canonical_root.join(relative));
    let inside = candidate
        .strip_prefix(&canonical_root)
        .map_err(|_| ShelfError::PathEscape {
            path: relative.to_string(),
            context: ErrorContext::new(COMPONENT)
                .with_operation("resolve_within")
                .with_metadata("root", &canonical_root.display().to_string()),
        })?;

    let parts: Vec<String> = inside
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}
