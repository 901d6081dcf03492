//! Backing store contract.
//!
//! A store owns the actual entries: it looks up and creates children, pages
//! through directory listings, and performs the byte-level and structural
//! mutations. Everything in `fs` is written against these traits.

pub mod memory;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::fs::{Entry, EntryKind, Metadata, StorageType, Usage};

pub use memory::MemoryStore;

/// Failure kinds a store can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// No entry with that name
    NotFound,
    /// Entry exists but has the other kind
    TypeMismatch,
    /// Exclusive creation hit an existing entry
    PathExists,
    /// Structural change the store refuses (e.g. moving a directory into itself)
    InvalidModification,
    /// Anything else, e.g. a malformed entry name
    Other,
}

impl StoreErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            StoreErrorKind::NotFound => "NotFoundError",
            StoreErrorKind::TypeMismatch => "TypeMismatchError",
            StoreErrorKind::PathExists => "PathExistsError",
            StoreErrorKind::InvalidModification => "InvalidModificationError",
            StoreErrorKind::Other => "Error",
        }
    }
}

/// Error returned by a store primitive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}: {message}", .kind.name())]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(path: &str) -> Self {
        Self::new(
            StoreErrorKind::NotFound,
            format!("A requested file or directory could not be found: {}", path),
        )
    }

    pub fn type_mismatch(path: &str) -> Self {
        Self::new(
            StoreErrorKind::TypeMismatch,
            format!("The entry has the wrong type: {}", path),
        )
    }

    pub fn path_exists(path: &str) -> Self {
        Self::new(
            StoreErrorKind::PathExists,
            format!("An entry already exists: {}", path),
        )
    }
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Flags for `EntryStore::get_child`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ChildOptions {
    /// Create the child if missing
    pub create: bool,
    /// With `create`, fail if the child already exists
    pub exclusive: bool,
}

impl ChildOptions {
    pub const LOOKUP: ChildOptions = ChildOptions {
        create: false,
        exclusive: false,
    };
    pub const CREATE: ChildOptions = ChildOptions {
        create: true,
        exclusive: false,
    };
    pub const CREATE_EXCLUSIVE: ChildOptions = ChildOptions {
        create: true,
        exclusive: true,
    };
}

/// How `EntryStore::write` treats existing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the content
    Truncate,
    /// Write after the current end
    Append,
}

/// Pages through one directory's children.
#[async_trait]
pub trait EntryReader: Send {
    /// Next page of children. An empty page means the listing is complete.
    async fn read_entries(&mut self) -> StoreResult<Vec<Entry>>;
}

/// Entry-oriented storage with named children and paginated listings.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Root directory of the given storage area.
    async fn get_root(&self, storage: StorageType, granted_bytes: u64) -> StoreResult<Entry>;

    /// Look up (or create) the child `name` of kind `kind` under `dir`.
    ///
    /// Reports `NotFound` when missing and not created, `TypeMismatch` when the
    /// child exists with the other kind, `PathExists` on exclusive creation of
    /// an existing child.
    async fn get_child(
        &self,
        dir: &Entry,
        name: &str,
        kind: EntryKind,
        options: ChildOptions,
    ) -> StoreResult<Entry>;

    /// Open a paginated reader over `dir`'s children.
    fn create_reader(&self, dir: &Entry) -> Box<dyn EntryReader>;

    async fn metadata(&self, entry: &Entry) -> StoreResult<Metadata>;

    /// Remove a file or an empty directory.
    async fn remove(&self, entry: &Entry) -> StoreResult<()>;

    async fn remove_recursively(&self, dir: &Entry) -> StoreResult<()>;

    async fn move_to(&self, entry: &Entry, parent: &Entry, name: &str) -> StoreResult<Entry>;

    async fn copy_to(&self, entry: &Entry, parent: &Entry, name: &str) -> StoreResult<Entry>;

    fn to_url(&self, entry: &Entry) -> String;

    async fn read(&self, file: &Entry) -> StoreResult<Vec<u8>>;

    async fn write(&self, file: &Entry, data: &[u8], mode: WriteMode) -> StoreResult<()>;

    /// Ask for `bytes` of quota; returns the granted amount.
    async fn request_quota(&self, storage: StorageType, bytes: u64) -> StoreResult<u64>;

    async fn query_usage(&self, storage: StorageType) -> StoreResult<Usage>;
}
