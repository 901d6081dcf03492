//! Entries, paths and the path-based operations of a `Session`.

mod entry;
pub(crate) mod operations;
pub mod options;
pub mod path;

pub use entry::{Entry, EntryId, EntryKind, ListedEntry, Metadata, Stat, StorageType, Usage};
pub use operations::Transfer;
pub use options::{InitOptions, MoveOptions, ResolveOptions};
pub use path::{parse_path, split_path, ParsedPath, PathRef};
