//! File content reads and writes.

use log::debug;
use serde_json::json;

use super::annotate;
use crate::error::Result;
use crate::fs::path::PathRef;
use crate::fs::{Entry, ResolveOptions};
use crate::session::Session;
use crate::store::WriteMode;

impl Session {
    /// Read the whole content of a file.
    pub async fn read_file(&self, path: impl Into<PathRef>) -> Result<Vec<u8>> {
        let file = self.get_file(path, ResolveOptions::default()).await?;
        self.store()
            .read(&file)
            .await
            .map_err(annotate("read", json!([file.full_path])))
    }

    /// Read a file as UTF-8 text.
    pub async fn read_file_to_string(&self, path: impl Into<PathRef>) -> Result<String> {
        let data = self.read_file(path).await?;
        Ok(String::from_utf8(data)?)
    }

    /// Write data to a file, replacing its content.
    ///
    /// Missing parent directories and the file itself are created.
    ///
    /// # Example
    /// ```no_run
    /// # use sandfs::Session;
    /// # async fn example(session: &Session) -> sandfs::Result<()> {
    /// let entry = session.write_file("notes/today.txt", "abc").await?;
    /// assert_eq!(entry.full_path, "/notes/today.txt");
    /// # Ok(())
    /// # }
    /// ```
    pub async fn write_file(
        &self,
        path: impl Into<PathRef>,
        data: impl AsRef<[u8]>,
    ) -> Result<Entry> {
        let file = self.get_file(path, ResolveOptions::overwrite()).await?;
        self.write_entry(file, data.as_ref(), WriteMode::Truncate)
            .await
    }

    /// Append data to a file, creating it if missing.
    pub async fn append_file(
        &self,
        path: impl Into<PathRef>,
        data: impl AsRef<[u8]>,
    ) -> Result<Entry> {
        let file = self.get_file(path, ResolveOptions::create()).await?;
        self.write_entry(file, data.as_ref(), WriteMode::Append)
            .await
    }

    async fn write_entry(&self, file: Entry, data: &[u8], mode: WriteMode) -> Result<Entry> {
        self.store()
            .write(&file, data, mode)
            .await
            .map_err(annotate("write", json!([file.full_path, data.len()])))?;
        debug!("wrote {} bytes to {} ({:?})", data.len(), file.full_path, mode);
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::error::ErrorKind;
    use crate::fs::InitOptions;
    use crate::store::MemoryStore;

    use super::*;

    async fn session() -> Session {
        let mut session = Session::new(Arc::new(MemoryStore::new()));
        session.init(InitOptions::temporary()).await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let session = session().await;
        let entry = session.write_file("a.txt", "abc").await.unwrap();
        assert!(entry.is_file());
        assert_eq!(entry.full_path, "/a.txt");
        assert_eq!(session.read_file("a.txt").await.unwrap(), b"abc");
        assert_eq!(session.read_file(&entry).await.unwrap(), b"abc");
    }

    #[tokio::test]
    async fn test_overwrite_truncates() {
        let session = session().await;
        session.write_file("a.txt", "abc").await.unwrap();
        session.write_file("a.txt", "d").await.unwrap();
        assert_eq!(session.read_file_to_string("a.txt").await.unwrap(), "d");
    }

    #[tokio::test]
    async fn test_write_creates_directories() {
        let session = session().await;
        session.write_file("a/b/c.txt", "abc").await.unwrap();
        assert!(session.exists("a").await.unwrap());
        assert!(session.exists("a/b").await.unwrap());
        assert_eq!(session.read_file_to_string("a/b/c.txt").await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_append() {
        let session = session().await;
        session.append_file("new.txt", "def").await.unwrap();
        assert_eq!(session.read_file_to_string("new.txt").await.unwrap(), "def");

        session.write_file("a.txt", "abc").await.unwrap();
        session.append_file("a.txt", "def").await.unwrap();
        assert_eq!(session.read_file_to_string("a.txt").await.unwrap(), "abcdef");
    }

    #[tokio::test]
    async fn test_binary_round_trip() {
        let session = session().await;
        let data = [42u8, 0, 0, 0, 24, 0, 0, 0];
        session.write_file("bin", data).await.unwrap();
        assert_eq!(session.read_file("bin").await.unwrap(), data);
        session.write_file("bad", [0xffu8, 0xfe]).await.unwrap();
        let err = session.read_file_to_string("bad").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[tokio::test]
    async fn test_read_missing_file() {
        let session = session().await;
        let err = session.read_file("a.txt").await.unwrap_err();
        assert!(err.is_not_found());
        let message = err.to_string();
        assert!(message.contains("a.txt"));
        assert!(message.contains("get_file"));
    }
}
