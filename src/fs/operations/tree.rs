//! Directory listings: paginated single level and recursive deep reads.

use futures::future::{try_join_all, BoxFuture, FutureExt};
use log::trace;
use serde_json::json;

use super::annotate;
use crate::error::Result;
use crate::fs::{Entry, ListedEntry};
use crate::session::Session;

impl Session {
    /// Read all children of `dir`.
    ///
    /// The store hands out bounded pages, so this keeps reading until a page
    /// comes back empty. Order is whatever the store reports.
    pub async fn read_directory(&self, dir: &Entry) -> Result<Vec<Entry>> {
        let mut reader = self.store().create_reader(dir);
        let mut entries = Vec::new();
        loop {
            let page = reader
                .read_entries()
                .await
                .map_err(annotate("read_entries", json!([dir.full_path])))?;
            if page.is_empty() {
                break;
            }
            trace!("{}: read page of {} entries", dir.full_path, page.len());
            entries.extend(page);
        }
        Ok(entries)
    }

    /// Read the whole subtree under `dir`.
    ///
    /// Every directory carries its own listing in `children`; files never do.
    /// Sibling subtrees are read concurrently.
    pub fn read_directory_deep<'a>(
        &'a self,
        dir: &'a Entry,
    ) -> BoxFuture<'a, Result<Vec<ListedEntry>>> {
        async move {
            let entries = self.read_directory(dir).await?;
            try_join_all(entries.into_iter().map(|entry| self.expand(entry))).await
        }
        .boxed()
    }

    async fn expand(&self, entry: Entry) -> Result<ListedEntry> {
        if !entry.is_directory() {
            return Ok(ListedEntry::shallow(entry));
        }
        let children = self.read_directory_deep(&entry).await?;
        Ok(ListedEntry {
            entry,
            children: Some(children),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use crate::fs::{InitOptions, ResolveOptions};
    use crate::store::MemoryStore;

    use super::*;

    async fn session_with(store: MemoryStore) -> Session {
        let mut session = Session::new(Arc::new(store));
        session.init(InitOptions::temporary()).await.unwrap();
        session
    }

    fn collect_paths(listing: &[ListedEntry], out: &mut Vec<String>) {
        for item in listing {
            out.push(item.entry.full_path.clone());
            if let Some(children) = &item.children {
                collect_paths(children, out);
            }
        }
    }

    #[tokio::test]
    async fn test_read_directory_follows_pagination() {
        let session = session_with(MemoryStore::new().with_page_size(2)).await;
        for name in ["a", "b", "c", "d", "e"] {
            session
                .get_file(name, ResolveOptions::overwrite())
                .await
                .unwrap();
        }
        let root = session.root_entry().unwrap().clone();
        let entries = session.read_directory(&root).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn test_read_empty_directory() {
        let session = session_with(MemoryStore::new()).await;
        let dir = session
            .get_directory("a/b", ResolveOptions::create())
            .await
            .unwrap();
        assert!(session.read_directory(&dir).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deep_read_attaches_children_to_directories_only() {
        let session = session_with(MemoryStore::new().with_page_size(2)).await;
        session
            .get_directory("c", ResolveOptions::create())
            .await
            .unwrap();
        session
            .get_directory("a/b", ResolveOptions::create())
            .await
            .unwrap();
        session
            .get_file("a.txt", ResolveOptions::overwrite())
            .await
            .unwrap();
        session
            .get_file("a/b/c.txt", ResolveOptions::overwrite())
            .await
            .unwrap();

        let root = session.root_entry().unwrap().clone();
        let tree = session.read_directory_deep(&root).await.unwrap();
        assert_eq!(tree.len(), 3);

        let c = tree.iter().find(|e| e.name() == "c").unwrap();
        assert_eq!(c.children.as_deref(), Some(&[][..]));

        let file = tree.iter().find(|e| e.name() == "a.txt").unwrap();
        assert!(file.children.is_none());

        let a = tree.iter().find(|e| e.name() == "a").unwrap();
        let b = &a.children.as_ref().unwrap()[0];
        assert_eq!(b.name(), "b");
        let leaf = &b.children.as_ref().unwrap()[0];
        assert_eq!(leaf.entry.full_path, "/a/b/c.txt");
        assert!(leaf.children.is_none());
    }

    #[tokio::test]
    async fn test_deep_read_matches_recursive_shallow_reads() {
        let session = session_with(MemoryStore::new().with_page_size(3)).await;
        for path in ["x/1", "x/2", "x/y/3", "x/y/z/4", "w/5", "6"] {
            session
                .get_file(path, ResolveOptions::overwrite())
                .await
                .unwrap();
        }
        let root = session.root_entry().unwrap().clone();

        let tree = session.read_directory_deep(&root).await.unwrap();
        let mut deep = Vec::new();
        collect_paths(&tree, &mut deep);

        let mut shallow = Vec::new();
        let mut stack = vec![root];
        while let Some(dir) = stack.pop() {
            for entry in session.read_directory(&dir).await.unwrap() {
                shallow.push(entry.full_path.clone());
                if entry.is_directory() {
                    stack.push(entry);
                }
            }
        }

        assert_eq!(deep.len(), shallow.len());
        let unique: HashSet<&String> = deep.iter().collect();
        assert_eq!(unique.len(), deep.len());
        assert_eq!(unique, shallow.iter().collect::<HashSet<_>>());
    }
}
