//! # sandfs
//!
//! Path-based filesystem operations over a hierarchical entry store.
//!
//! ## Features
//!
//! - **Sessions**: Acquire a persistent or temporary storage root, with an optional quota request.
//! - **Path Resolution**:
//!   - Resolve `/`-separated paths one segment at a time from the root.
//!   - Create missing directories along the way (`mkdir -p` semantics).
//!   - Accept either a path string or an already resolved `Entry` everywhere.
//! - **Filesystem Operations**:
//!   - Read, write and append files.
//!   - List directories, shallow or as a full tree (`readdir`).
//!   - Move, rename and copy files and directories.
//!   - Remove files (`unlink`) and directory trees (`rmdir`), or clear everything.
//!   - Get entry info (`stat`), store URLs and storage usage.
//! - **Stores**: Anything implementing [`EntryStore`]; [`MemoryStore`] is bundled.
//!
//! Store failures surface as [`FsError`] values that carry the failing call,
//! e.g. `get_file(["a.txt",{"create":false,"exclusive":false}])`.
//!
//! ## Example: Basic Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sandfs::{InitOptions, MemoryStore, MoveOptions, Session};
//!
//! # async fn example() -> sandfs::Result<()> {
//! let mut session = Session::new(Arc::new(MemoryStore::new()));
//! session.init(InitOptions::persistent(1024 * 1024)).await?;
//!
//! // Parent directories are created on write
//! session.write_file("docs/readme.txt", "hello").await?;
//! session.rename("docs/readme.txt", "archive/readme.txt", MoveOptions { create: true }).await?;
//!
//! for item in session.readdir("/", true).await? {
//!     println!("{} ({} descendants)", item.entry.full_path, item.descendant_count());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: Shared Handle
//!
//! `FsHandle` runs a session on its own task; clones share it and commands
//! are applied one at a time.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sandfs::{FsHandle, InitOptions, MemoryStore};
//!
//! # async fn example() -> sandfs::Result<()> {
//! let fs = FsHandle::open(Arc::new(MemoryStore::new()), InitOptions::temporary()).await?;
//! fs.write_file("a.txt", "abc").await?;
//! assert_eq!(fs.read_file_to_string("a.txt").await?, "abc");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod fs;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use error::{ErrorKind, FsError, Result};
pub use fs::{
    Entry, EntryId, EntryKind, InitOptions, ListedEntry, Metadata, MoveOptions, PathRef,
    ResolveOptions, Stat, StorageType, Transfer, Usage,
};
pub use session::{FsHandle, Session};
pub use store::{EntryReader, EntryStore, MemoryStore, StoreError, StoreErrorKind};
