//! Option structs for filesystem operations.

use crate::fs::entry::StorageType;

/// Options for `Session::init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitOptions {
    /// Storage class of the root
    pub storage: StorageType,
    /// Bytes to request
    pub bytes: u64,
    /// Ask the store for quota before acquiring the root (persistent storage only)
    pub request_quota: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            storage: StorageType::Persistent,
            bytes: 0,
            request_quota: true,
        }
    }
}

impl InitOptions {
    pub fn temporary() -> Self {
        Self {
            storage: StorageType::Temporary,
            request_quota: false,
            ..Self::default()
        }
    }

    pub fn persistent(bytes: u64) -> Self {
        Self {
            bytes,
            ..Self::default()
        }
    }
}

/// Options for resolving a path to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolveOptions {
    /// Create missing intermediate directories and the final node
    pub create: bool,
    /// When creating a file, replace an existing one rather than reuse it
    pub overwrite: bool,
}

impl ResolveOptions {
    pub fn create() -> Self {
        Self {
            create: true,
            overwrite: false,
        }
    }

    pub fn overwrite() -> Self {
        Self {
            create: true,
            overwrite: true,
        }
    }
}

/// Options for `rename` and `copy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveOptions {
    /// Create missing destination directories
    pub create: bool,
}

impl From<MoveOptions> for ResolveOptions {
    fn from(options: MoveOptions) -> Self {
        ResolveOptions {
            create: options.create,
            overwrite: false,
        }
    }
}
