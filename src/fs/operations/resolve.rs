//! Path resolution: directories segment by segment, then the leaf file.

use log::{debug, warn};
use serde_json::json;

use super::annotate;
use crate::error::{FsError, Result};
use crate::fs::path::{parse_path, split_path, ParsedPath, PathRef};
use crate::fs::{Entry, EntryKind, ResolveOptions};
use crate::session::Session;
use crate::store::{ChildOptions, StoreErrorKind};

impl Session {
    /// Resolve a directory by path, starting from the root.
    ///
    /// With `options.create`, missing directories along the path are created.
    /// An already-resolved entry is returned as-is if it is a directory.
    pub async fn get_directory(
        &self,
        path: impl Into<PathRef>,
        options: ResolveOptions,
    ) -> Result<Entry> {
        match path.into() {
            PathRef::Entry(entry) => expect_kind(entry, EntryKind::Directory),
            PathRef::Path(path) => {
                let segments = split_path(&path)?;
                self.resolve_segments(&segments, options.create).await
            }
        }
    }

    /// Resolve a file by path.
    ///
    /// - `create=false`: the file must exist.
    /// - `create=true, overwrite=true`: get-or-create through the store's create primitive.
    /// - `create=true, overwrite=false`: reuse an existing file untouched, create it otherwise.
    ///
    /// Missing parent directories are created whenever `create` is set.
    pub async fn get_file(
        &self,
        path: impl Into<PathRef>,
        options: ResolveOptions,
    ) -> Result<Entry> {
        let path = match path.into() {
            PathRef::Entry(entry) => return expect_kind(entry, EntryKind::File),
            PathRef::Path(path) => path,
        };
        let ParsedPath {
            dir_path,
            file_name,
        } = parse_path(&path)?;
        let dir = self.get_directory(dir_path, options).await?;
        if file_name.is_empty() {
            // The path names the root itself.
            return expect_kind(dir, EntryKind::File);
        }

        if !options.create {
            return self.child_file(&dir, &file_name, ChildOptions::LOOKUP).await;
        }
        if options.overwrite {
            return self.child_file(&dir, &file_name, ChildOptions::CREATE).await;
        }

        match self
            .store()
            .get_child(&dir, &file_name, EntryKind::File, ChildOptions::LOOKUP)
            .await
        {
            Ok(file) => Ok(file),
            Err(e) if e.kind == StoreErrorKind::NotFound => {
                self.child_file(&dir, &file_name, ChildOptions::CREATE).await
            }
            Err(e) => Err(annotate(
                "get_file",
                json!([file_name, ChildOptions::LOOKUP]),
            )(e)),
        }
    }

    /// Resolve a path as a file, falling back to a directory on type mismatch.
    pub async fn get_entry(&self, path: impl Into<PathRef>) -> Result<Entry> {
        let path = path.into();
        if let PathRef::Entry(entry) = &path {
            return Ok(entry.clone());
        }
        match self.get_file(path.clone(), ResolveOptions::default()).await {
            Err(e) if e.is_type_mismatch() => {
                self.get_directory(path, ResolveOptions::default()).await
            }
            res => res,
        }
    }

    /// Fold over segments from the root, one store lookup per segment.
    pub(crate) async fn resolve_segments(&self, segments: &[&str], create: bool) -> Result<Entry> {
        let mut dir = self.root_entry()?.clone();
        for name in segments {
            let lookup = self
                .store()
                .get_child(&dir, name, EntryKind::Directory, ChildOptions::LOOKUP)
                .await;
            dir = match lookup {
                Ok(child) => child,
                Err(e) if create && e.kind == StoreErrorKind::NotFound => {
                    self.create_child_directory(&dir, name).await?
                }
                Err(e) => {
                    return Err(annotate(
                        "get_directory",
                        json!([name, ChildOptions::LOOKUP]),
                    )(e))
                }
            };
        }
        debug!("resolved directory {}", dir.full_path);
        Ok(dir)
    }

    /// Exclusive creation; a concurrent creator winning the race turns into a lookup.
    async fn create_child_directory(&self, parent: &Entry, name: &str) -> Result<Entry> {
        let created = self
            .store()
            .get_child(
                parent,
                name,
                EntryKind::Directory,
                ChildOptions::CREATE_EXCLUSIVE,
            )
            .await;
        match created {
            Ok(dir) => {
                debug!("created directory {}", dir.full_path);
                Ok(dir)
            }
            Err(e) if e.kind == StoreErrorKind::PathExists => {
                warn!(
                    "directory {} appeared during creation, looking it up",
                    e.message
                );
                self.store()
                    .get_child(parent, name, EntryKind::Directory, ChildOptions::LOOKUP)
                    .await
                    .map_err(annotate(
                        "get_directory",
                        json!([name, ChildOptions::LOOKUP]),
                    ))
            }
            Err(e) => Err(annotate(
                "get_directory",
                json!([name, ChildOptions::CREATE_EXCLUSIVE]),
            )(e)),
        }
    }

    async fn child_file(&self, dir: &Entry, name: &str, options: ChildOptions) -> Result<Entry> {
        self.store()
            .get_child(dir, name, EntryKind::File, options)
            .await
            .map_err(annotate("get_file", json!([name, options])))
    }
}

fn expect_kind(entry: Entry, kind: EntryKind) -> Result<Entry> {
    if entry.kind == kind {
        return Ok(entry);
    }
    Err(FsError::TypeMismatch {
        message: format!(
            "Expected {} but got {}: {}",
            kind.as_str(),
            entry.kind.as_str(),
            entry.full_path
        ),
        call: format!("get_{}({})", kind.as_str(), json!([entry.full_path])),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::error::ErrorKind;
    use crate::fs::InitOptions;
    use crate::session::Session;
    use async_trait::async_trait;

    use crate::fs::{Metadata, StorageType, Usage};
    use crate::store::{EntryReader, EntryStore, MemoryStore, StoreResult, WriteMode};

    use super::*;

    /// Creates every directory just before an exclusive creation of it is
    /// forwarded, as if another caller won the race.
    struct RacingStore(MemoryStore);

    #[async_trait]
    impl EntryStore for RacingStore {
        async fn get_root(&self, storage: StorageType, granted_bytes: u64) -> StoreResult<Entry> {
            self.0.get_root(storage, granted_bytes).await
        }

        async fn get_child(
            &self,
            dir: &Entry,
            name: &str,
            kind: EntryKind,
            options: ChildOptions,
        ) -> StoreResult<Entry> {
            if options == ChildOptions::CREATE_EXCLUSIVE {
                self.0.get_child(dir, name, kind, ChildOptions::CREATE).await?;
            }
            self.0.get_child(dir, name, kind, options).await
        }

        fn create_reader(&self, dir: &Entry) -> Box<dyn EntryReader> {
            self.0.create_reader(dir)
        }

        async fn metadata(&self, entry: &Entry) -> StoreResult<Metadata> {
            self.0.metadata(entry).await
        }

        async fn remove(&self, entry: &Entry) -> StoreResult<()> {
            self.0.remove(entry).await
        }

        async fn remove_recursively(&self, dir: &Entry) -> StoreResult<()> {
            self.0.remove_recursively(dir).await
        }

        async fn move_to(&self, entry: &Entry, parent: &Entry, name: &str) -> StoreResult<Entry> {
            self.0.move_to(entry, parent, name).await
        }

        async fn copy_to(&self, entry: &Entry, parent: &Entry, name: &str) -> StoreResult<Entry> {
            self.0.copy_to(entry, parent, name).await
        }

        fn to_url(&self, entry: &Entry) -> String {
            self.0.to_url(entry)
        }

        async fn read(&self, file: &Entry) -> StoreResult<Vec<u8>> {
            self.0.read(file).await
        }

        async fn write(&self, file: &Entry, data: &[u8], mode: WriteMode) -> StoreResult<()> {
            self.0.write(file, data, mode).await
        }

        async fn request_quota(&self, storage: StorageType, bytes: u64) -> StoreResult<u64> {
            self.0.request_quota(storage, bytes).await
        }

        async fn query_usage(&self, storage: StorageType) -> StoreResult<Usage> {
            self.0.query_usage(storage).await
        }
    }

    async fn session() -> (Session, MemoryStore) {
        let store = MemoryStore::new();
        let mut session = Session::new(Arc::new(store.clone()));
        session.init(InitOptions::temporary()).await.unwrap();
        (session, store)
    }

    #[tokio::test]
    async fn test_empty_path_is_root() {
        let (session, store) = session().await;
        let calls = store.call_count();
        let root = session
            .get_directory("/", ResolveOptions::default())
            .await
            .unwrap();
        assert_eq!(&root, session.root_entry().unwrap());
        let root = session
            .get_directory("", ResolveOptions::default())
            .await
            .unwrap();
        assert_eq!(root.full_path, "/");
        assert_eq!(store.call_count(), calls);
    }

    #[tokio::test]
    async fn test_missing_directory_is_not_found_with_path() {
        let (session, _) = session().await;
        let err = session
            .get_directory("a/b", ResolveOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("/a"));
        assert!(err.to_string().contains("get_directory"));
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let (session, store) = session().await;
        let first = session
            .get_directory("a/b/c", ResolveOptions::create())
            .await
            .unwrap();
        let mutations = store.mutation_count();
        let second = session
            .get_directory("a/b/c", ResolveOptions::create())
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.full_path, "/a/b/c");
        assert_eq!(store.mutation_count(), mutations);
    }

    #[tokio::test]
    async fn test_wrong_type_resolution() {
        let (session, _) = session().await;
        session
            .get_file("a.txt", ResolveOptions::overwrite())
            .await
            .unwrap();
        session
            .get_directory("d", ResolveOptions::create())
            .await
            .unwrap();

        let err = session
            .get_directory("a.txt", ResolveOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);

        let err = session
            .get_file("d", ResolveOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);

        // A file in the middle of a path is a mismatch even when creating.
        let err = session
            .get_directory("a.txt/x", ResolveOptions::create())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    }

    #[tokio::test]
    async fn test_resolved_entries_short_circuit() {
        let (session, store) = session().await;
        let file = session
            .get_file("a/f.txt", ResolveOptions::overwrite())
            .await
            .unwrap();
        let dir = session
            .get_directory("a", ResolveOptions::default())
            .await
            .unwrap();
        let calls = store.call_count();

        assert_eq!(
            session
                .get_file(&file, ResolveOptions::default())
                .await
                .unwrap(),
            file
        );
        assert_eq!(
            session
                .get_directory(&dir, ResolveOptions::default())
                .await
                .unwrap(),
            dir
        );
        assert_eq!(store.call_count(), calls);

        let err = session
            .get_directory(&file, ResolveOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_type_mismatch());
        let err = session
            .get_file(&dir, ResolveOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_type_mismatch());
    }

    #[tokio::test]
    async fn test_create_if_missing_reuses_existing_file() {
        let (session, store) = session().await;
        let created = session
            .get_file("a.txt", ResolveOptions::create())
            .await
            .unwrap();
        assert!(created.is_file());
        assert!(store.read(&created).await.unwrap().is_empty());

        store
            .write(&created, b"abc", WriteMode::Truncate)
            .await
            .unwrap();

        let again = session
            .get_file("a.txt", ResolveOptions::create())
            .await
            .unwrap();
        assert_eq!(again.id, created.id);
        assert_eq!(store.read(&again).await.unwrap(), b"abc");
    }

    #[tokio::test]
    async fn test_get_file_creates_parents() {
        let (session, _) = session().await;
        let file = session
            .get_file("./x/y/z.txt", ResolveOptions::overwrite())
            .await
            .unwrap();
        assert_eq!(file.full_path, "/x/y/z.txt");

        let err = session
            .get_file("x/missing/z.txt", ResolveOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_get_entry_falls_back_to_directory() {
        let (session, _) = session().await;
        session
            .get_directory("a", ResolveOptions::create())
            .await
            .unwrap();
        assert!(session.get_entry("a").await.unwrap().is_directory());
        assert!(session.get_entry("/").await.unwrap().is_directory());
        assert!(session.get_entry("nope").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_lost_creation_race_falls_back_to_lookup() {
        let mut session = Session::new(Arc::new(RacingStore(MemoryStore::new())));
        session.init(InitOptions::temporary()).await.unwrap();
        let dir = session
            .get_directory("a/b", ResolveOptions::create())
            .await
            .unwrap();
        assert_eq!(dir.full_path, "/a/b");
        assert!(session.exists("a/b").await.unwrap());
    }

    #[tokio::test]
    async fn test_trailing_separator_is_invalid() {
        let (session, _) = session().await;
        let err = session
            .get_file("a/", ResolveOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPath);
    }
}
