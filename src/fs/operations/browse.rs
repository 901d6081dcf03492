//! Read-only queries: existence, stat, listings, URLs.

use serde_json::json;

use super::annotate;
use crate::error::Result;
use crate::fs::path::PathRef;
use crate::fs::{ListedEntry, ResolveOptions, Stat};
use crate::session::Session;

impl Session {
    /// Check that a file or directory exists at `path`.
    ///
    /// Only "not found" turns into `false`; any other failure is returned.
    pub async fn exists(&self, path: impl Into<PathRef>) -> Result<bool> {
        match self.get_entry(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Get info about a file or directory.
    ///
    /// # Example
    /// ```no_run
    /// # use std::sync::Arc;
    /// # use sandfs::{InitOptions, MemoryStore, Session};
    /// # async fn example() -> sandfs::Result<()> {
    /// let mut session = Session::new(Arc::new(MemoryStore::new()));
    /// session.init(InitOptions::temporary()).await?;
    /// session.write_file("a.txt", "abc").await?;
    /// let stat = session.stat("a.txt").await?;
    /// assert_eq!(stat.size, 3);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn stat(&self, path: impl Into<PathRef>) -> Result<Stat> {
        let entry = self.get_entry(path).await?;
        let metadata = self
            .store()
            .metadata(&entry)
            .await
            .map_err(annotate("get_metadata", json!([entry.full_path])))?;
        Ok(Stat::from_entry(&entry, metadata))
    }

    /// List a directory.
    ///
    /// # Arguments
    /// * `path` - The directory to list (`"/"` for the root)
    /// * `deep` - If true, every directory in the result carries its subtree
    pub async fn readdir(&self, path: impl Into<PathRef>, deep: bool) -> Result<Vec<ListedEntry>> {
        let dir = self.get_directory(path, ResolveOptions::default()).await?;
        if deep {
            self.read_directory_deep(&dir).await
        } else {
            let entries = self.read_directory(&dir).await?;
            Ok(entries.into_iter().map(ListedEntry::shallow).collect())
        }
    }

    /// Get the store URL of a file or directory.
    pub async fn get_url(&self, path: impl Into<PathRef>) -> Result<String> {
        let entry = self.get_entry(path).await?;
        Ok(self.store().to_url(&entry))
    }
}
