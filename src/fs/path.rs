//! Path splitting and path-or-entry arguments.

use crate::error::{FsError, Result};
use crate::fs::entry::Entry;

/// Path argument accepted by every operation: a path string or an entry
/// that was already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRef {
    Path(String),
    Entry(Entry),
}

impl PathRef {
    /// The path string, if this is not a resolved entry.
    pub fn as_path(&self) -> Option<&str> {
        match self {
            PathRef::Path(p) => Some(p),
            PathRef::Entry(_) => None,
        }
    }
}

impl From<&str> for PathRef {
    fn from(path: &str) -> Self {
        PathRef::Path(path.to_string())
    }
}

impl From<String> for PathRef {
    fn from(path: String) -> Self {
        PathRef::Path(path)
    }
}

impl From<&String> for PathRef {
    fn from(path: &String) -> Self {
        PathRef::Path(path.clone())
    }
}

impl From<Entry> for PathRef {
    fn from(entry: Entry) -> Self {
        PathRef::Entry(entry)
    }
}

impl From<&Entry> for PathRef {
    fn from(entry: &Entry) -> Self {
        PathRef::Entry(entry.clone())
    }
}

/// A path split into its parent directory and leaf name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPath {
    /// Parent path, segments joined with `/` (empty for the root)
    pub dir_path: String,
    /// Final segment (empty when the path is the root)
    pub file_name: String,
}

/// Split a path into non-empty segments.
///
/// One leading `./` is stripped. Paths longer than one character may not end
/// with `/`. The root (`""` or `/`) yields no segments.
pub fn split_path(path: &str) -> Result<Vec<&str>> {
    let path = path.strip_prefix("./").unwrap_or(path);
    if path.len() > 1 && path.ends_with('/') {
        return Err(FsError::InvalidPath(format!(
            "Path can not end with '/': {}",
            path
        )));
    }
    Ok(path.split('/').filter(|s| !s.is_empty()).collect())
}

/// Split a path into parent directory path and leaf name.
pub fn parse_path(path: &str) -> Result<ParsedPath> {
    let mut parts = split_path(path)?;
    let file_name = parts.pop().unwrap_or_default().to_string();
    Ok(ParsedPath {
        dir_path: parts.join("/"),
        file_name,
    })
}
