//! Splitting of percent-encoded `group/name/path` request tails
//!
//! The sub-path part may carry `%2F` for its own separators, so boundaries are
//! located on the raw string first and every segment is decoded on its own.
//! Decoding the whole tail up front would turn those `%2F` into separators
//! and shift the group/name boundary.

use gitshelf_core::{malformed_path_error, ShelfResult};
use std::borrow::Cow;

const COMPONENT: &str = "path_codec";

/// A decoded `group/name[/path]` triple
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryPath {
    pub group: String,
    pub name: String,
    /// Repository-relative path; empty for the repository root
    pub remainder: String,
}

/// Raw segments of a tail, split on the first two unencoded `/`
struct RawSegments<'a> {
    group: &'a str,
    name: Option<&'a str>,
    remainder: Option<&'a str>,
}

fn split_raw(raw: &str) -> RawSegments<'_> {
    match raw.split_once('/') {
        None => RawSegments {
            group: raw,
            name: None,
            remainder: None,
        },
        Some((group, rest)) => match rest.split_once('/') {
            None => RawSegments {
                group,
                name: Some(rest),
                remainder: None,
            },
            Some((name, remainder)) => RawSegments {
                group,
                name: Some(name),
                remainder: Some(remainder),
            },
        },
    }
}

fn decode_segment(segment: &str, what: &str) -> ShelfResult<String> {
    urlencoding::decode(segment)
        .map(Cow::into_owned)
        .map_err(|e| malformed_path_error!(format!("Invalid encoding in {}: {}", what, e), COMPONENT))
}

/// Decode a group or repository name; these never contain a separator
fn decode_name(segment: Option<&str>, what: &str) -> ShelfResult<String> {
    let segment = segment
        .filter(|s| !s.is_empty())
        .ok_or_else(|| malformed_path_error!(format!("Missing {} segment", what), COMPONENT))?;

    let decoded = decode_segment(segment, what)?;
    if decoded.is_empty() || decoded.contains('/') {
        return Err(malformed_path_error!(
            format!("Invalid {} segment '{}'", what, segment),
            COMPONENT
        ));
    }
    Ok(decoded)
}

/// `group/name`, as used by repository detail and delete requests
pub fn decode_repository(raw: &str) -> ShelfResult<(String, String)> {
    let segments = split_raw(raw);
    if segments.remainder.is_some_and(|r| !r.is_empty()) {
        return Err(malformed_path_error!(
            format!("Unexpected path after repository in '{}'", raw),
            COMPONENT
        ));
    }

    let group = decode_name(Some(segments.group), "group")?;
    let name = decode_name(segments.name, "repository")?;
    Ok((group, name))
}

/// `group/name[/path]`; a missing or empty path denotes the repository root
pub fn decode_directory(raw: &str) -> ShelfResult<RepositoryPath> {
    let segments = split_raw(raw);
    let group = decode_name(Some(segments.group), "group")?;
    let name = decode_name(segments.name, "repository")?;
    let remainder = match segments.remainder {
        Some(r) => decode_segment(r, "path")?,
        None => String::new(),
    };

    Ok(RepositoryPath {
        group,
        name,
        remainder,
    })
}

/// `group/name/path` where the path must name a file
pub fn decode_file(raw: &str) -> ShelfResult<RepositoryPath> {
    let decoded = decode_directory(raw)?;
    if decoded.remainder.is_empty() {
        return Err(malformed_path_error!(
            format!("Missing file path in '{}'", raw),
            COMPONENT
        ));
    }
    Ok(decoded)
}

/// Inverse of [`decode_directory`]: every part is encoded on its own, so `/`
/// inside `path` becomes `%2F`
pub fn encode(group: &str, name: &str, path: &str) -> String {
    let mut encoded = format!("{}/{}", urlencoding::encode(group), urlencoding::encode(name));
    if !path.is_empty() {
        encoded.push('/');
        encoded.push_str(&urlencoding::encode(path));
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitshelf_core::ShelfError;

    #[test]
    fn test_decode_repository() {
        assert_eq!(
            decode_repository("git/proj").unwrap(),
            ("git".to_string(), "proj".to_string())
        );
        assert_eq!(
            decode_repository("git/proj/").unwrap(),
            ("git".to_string(), "proj".to_string())
        );
        assert!(matches!(
            decode_repository("git"),
            Err(ShelfError::MalformedPath { .. })
        ));
        assert!(matches!(
            decode_repository("git/proj/src"),
            Err(ShelfError::MalformedPath { .. })
        ));
    }

    #[test]
    fn test_encoded_separator_stays_in_remainder() {
        let decoded = decode_directory("git/proj/src%2Fnested%2Fdir").unwrap();
        assert_eq!(decoded.group, "git");
        assert_eq!(decoded.name, "proj");
        assert_eq!(decoded.remainder, "src/nested/dir");
    }

    #[test]
    fn test_encoded_separator_in_name_is_rejected() {
        // Decoding first would have produced group "git", name "a", path "b"
        assert!(matches!(
            decode_directory("git/a%2Fb"),
            Err(ShelfError::MalformedPath { .. })
        ));
    }

    #[test]
    fn test_empty_remainder_is_root() {
        assert_eq!(decode_directory("git/proj").unwrap().remainder, "");
        assert_eq!(decode_directory("git/proj/").unwrap().remainder, "");
    }

    #[test]
    fn test_file_requires_path() {
        assert!(matches!(
            decode_file("git/proj"),
            Err(ShelfError::MalformedPath { .. })
        ));
        assert!(matches!(
            decode_file("git"),
            Err(ShelfError::MalformedPath { .. })
        ));
        let decoded = decode_file("git/proj/docs%2Fread%20me.md").unwrap();
        assert_eq!(decoded.remainder, "docs/read me.md");
    }

    #[test]
    fn test_missing_segments() {
        assert!(decode_directory("").is_err());
        assert!(decode_directory("/proj").is_err());
        assert!(decode_directory("git/").is_err());
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        assert!(matches!(
            decode_directory("git/proj/%FF%FE"),
            Err(ShelfError::MalformedPath { .. })
        ));
    }

    #[test]
    fn test_encode_matches_decode() {
        let raw = encode("git", "proj", "src/a b/c.rs");
        assert_eq!(raw, "git/proj/src%2Fa%20b%2Fc.rs");

        let decoded = decode_file(&raw).unwrap();
        assert_eq!(decoded.remainder, "src/a b/c.rs");
        assert_eq!(encode("git", "proj", ""), "git/proj");
    }
}
