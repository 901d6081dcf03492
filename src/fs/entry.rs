//! Filesystem entry types.

use serde::{Deserialize, Serialize};

/// Storage class of a sandboxed filesystem root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// Survives until explicitly removed; needs granted quota.
    #[default]
    Persistent,
    /// May be evicted by the host at any time.
    Temporary,
}

impl StorageType {
    /// Lowercase name, as used in entry URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageType::Persistent => "persistent",
            StorageType::Temporary => "temporary",
        }
    }
}

/// Entry kind: the capability set of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
        }
    }
}

/// Opaque store-assigned identity of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u64);

/// A handle to a file or directory in the backing store.
///
/// Entries are not owned by this crate; they are resolved from the store and
/// passed back to it. `full_path` reflects the location at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    /// Store identity
    pub id: EntryId,
    /// File or directory
    pub kind: EntryKind,
    /// Final path segment (empty for the root)
    pub name: String,
    /// Root-relative path, always starting with `/`
    pub full_path: String,
}

impl Entry {
    pub fn new(
        id: EntryId,
        kind: EntryKind,
        name: impl Into<String>,
        full_path: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            full_path: full_path.into(),
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// One element of a directory listing.
///
/// `children` is set only for directories in a deep listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    pub entry: Entry,
    pub children: Option<Vec<ListedEntry>>,
}

impl ListedEntry {
    pub fn shallow(entry: Entry) -> Self {
        Self {
            entry,
            children: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.entry.name
    }

    /// Count of entries in this subtree, not including `self`.
    pub fn descendant_count(&self) -> usize {
        self.children
            .as_deref()
            .map(|c| c.iter().map(|e| 1 + e.descendant_count()).sum())
            .unwrap_or(0)
    }
}

/// Store-reported metadata of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    /// Milliseconds since the Unix epoch
    pub modification_time: i64,
    /// Size in bytes (0 for directories)
    pub size: u64,
}

/// Stat info for a file or directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stat {
    pub is_file: bool,
    pub is_directory: bool,
    pub name: String,
    pub full_path: String,
    pub modification_time: i64,
    pub size: u64,
}

impl Stat {
    pub(crate) fn from_entry(entry: &Entry, metadata: Metadata) -> Self {
        Self {
            is_file: entry.is_file(),
            is_directory: entry.is_directory(),
            name: entry.name.clone(),
            full_path: entry.full_path.clone(),
            modification_time: metadata.modification_time,
            size: metadata.size,
        }
    }
}

/// Storage usage information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    /// Bytes currently stored
    pub used_bytes: u64,
    /// Bytes granted to this origin
    pub granted_bytes: u64,
}

impl Usage {
    /// Get free storage in bytes.
    pub fn free(&self) -> u64 {
        self.granted_bytes.saturating_sub(self.used_bytes)
    }
}
