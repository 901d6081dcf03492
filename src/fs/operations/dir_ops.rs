//! Directory and node mutation operations.

use futures::future::try_join_all;
use log::debug;
use serde_json::json;

use super::annotate;
use crate::error::{FsError, Result};
use crate::fs::path::{parse_path, split_path, PathRef};
use crate::fs::{Entry, MoveOptions, ResolveOptions};
use crate::session::Session;

/// Which store primitive `move_or_copy` invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    Move,
    Copy,
}

impl Transfer {
    fn op(&self) -> &'static str {
        match self {
            Transfer::Move => "move_to",
            Transfer::Copy => "copy_to",
        }
    }
}

impl Session {
    /// Create a directory, including missing parents.
    pub async fn mkdir(&self, path: impl Into<PathRef>) -> Result<Entry> {
        self.get_directory(path, ResolveOptions::create()).await
    }

    /// Remove a directory recursively.
    ///
    /// A missing directory is not an error. Removing the root is refused;
    /// use `clear` instead.
    pub async fn rmdir(&self, path: impl Into<PathRef>) -> Result<()> {
        let dir = match self.get_directory(path, ResolveOptions::default()).await {
            Ok(dir) => dir,
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(e),
        };
        if dir.id == self.root_entry()?.id {
            return Err(FsError::InvalidOperation(
                "Can not rmdir root. Use clear() to clear fs.".to_string(),
            ));
        }
        self.store()
            .remove_recursively(&dir)
            .await
            .map_err(annotate("remove_recursively", json!([dir.full_path])))?;
        debug!("removed directory {}", dir.full_path);
        Ok(())
    }

    /// Remove a file. A missing file is not an error.
    pub async fn unlink(&self, path: impl Into<PathRef>) -> Result<()> {
        let file = match self.get_file(path, ResolveOptions::default()).await {
            Ok(file) => file,
            Err(e) if e.is_not_found() => return Ok(()),
            Err(e) => return Err(e),
        };
        self.store()
            .remove(&file)
            .await
            .map_err(annotate("remove", json!([file.full_path])))
    }

    /// Rename or move a file or directory.
    ///
    /// # Example
    /// ```no_run
    /// # use sandfs::{MoveOptions, Session};
    /// # async fn example(session: &Session) -> sandfs::Result<()> {
    /// session.rename("a.txt", "archive/a.txt", MoveOptions { create: true }).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn rename(
        &self,
        old_path: impl Into<PathRef>,
        new_path: &str,
        options: MoveOptions,
    ) -> Result<()> {
        self.move_or_copy(old_path.into(), new_path, Transfer::Move, options)
            .await
    }

    /// Copy a file or directory (directories are copied deeply).
    pub async fn copy(
        &self,
        old_path: impl Into<PathRef>,
        new_path: &str,
        options: MoveOptions,
    ) -> Result<()> {
        self.move_or_copy(old_path.into(), new_path, Transfer::Copy, options)
            .await
    }

    /// Resolve the source entry and the destination parent concurrently, then
    /// hand both to the store.
    ///
    /// Source and destination naming the same path is a no-op that touches
    /// no store state. A destination of `/` keeps the source's name.
    pub async fn move_or_copy(
        &self,
        old_path: PathRef,
        new_path: &str,
        transfer: Transfer,
        options: MoveOptions,
    ) -> Result<()> {
        if let PathRef::Path(old) = &old_path {
            if same_path(old, new_path) {
                return Ok(());
            }
        }
        let target = parse_path(new_path)?;
        let (entry, parent) = futures::try_join!(
            self.get_entry(old_path),
            self.get_directory(target.dir_path, ResolveOptions::from(options)),
        )?;
        // A destination naming the root moves the entry there under its own name.
        let name = if target.file_name.is_empty() {
            entry.name.clone()
        } else {
            target.file_name
        };
        let store = self.store();
        let moved = match transfer {
            Transfer::Move => store.move_to(&entry, &parent, &name).await,
            Transfer::Copy => store.copy_to(&entry, &parent, &name).await,
        }
        .map_err(annotate(
            transfer.op(),
            json!([entry.full_path, parent.full_path, name]),
        ))?;
        debug!("{} {} -> {}", transfer.op(), entry.full_path, moved.full_path);
        Ok(())
    }

    /// Remove everything under the root.
    ///
    /// Top-level entries are removed concurrently: directories recursively,
    /// files singly.
    pub async fn clear(&self) -> Result<()> {
        let root = self.root_entry()?.clone();
        let entries = self.read_directory(&root).await?;
        let store = self.store();
        let tasks = entries.iter().map(|entry| async move {
            if entry.is_directory() {
                store
                    .remove_recursively(entry)
                    .await
                    .map_err(annotate("remove_recursively", json!([entry.full_path])))
            } else {
                store
                    .remove(entry)
                    .await
                    .map_err(annotate("remove", json!([entry.full_path])))
            }
        });
        try_join_all(tasks).await?;
        debug!("cleared {} entries", entries.len());
        Ok(())
    }
}

/// Paths are compared by their segments, so `a.txt`, `./a.txt` and `/a.txt`
/// name the same entry.
fn same_path(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match (split_path(a), split_path(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
