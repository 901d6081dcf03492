//! In-memory entry store.
//!
//! Keeps every storage area as a tree in a single arena behind a mutex.
//! Listings are paginated like a browser sandbox (100 entries per page by
//! default), and URLs use the `filesystem:<origin>/<storage>/<path>` form.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use super::{
    ChildOptions, EntryReader, EntryStore, StoreError, StoreErrorKind, StoreResult, WriteMode,
};
use crate::fs::{Entry, EntryId, EntryKind, Metadata, StorageType, Usage};

/// Page size of a browser directory reader.
pub const DEFAULT_PAGE_SIZE: usize = 100;

const DEFAULT_ORIGIN: &str = "http://localhost";
const DEFAULT_CAPACITY: u64 = 10 * 1024 * 1024 * 1024;

#[derive(Debug, Clone)]
struct Node {
    name: String,
    parent: Option<u64>,
    kind: EntryKind,
    storage: StorageType,
    data: Vec<u8>,
    children: Vec<u64>,
    modified: i64,
}

#[derive(Debug, Default)]
struct Arena {
    nodes: HashMap<u64, Node>,
    roots: HashMap<StorageType, u64>,
    granted: HashMap<StorageType, u64>,
    next_id: u64,
}

impl Arena {
    fn node(&self, id: EntryId) -> StoreResult<&Node> {
        self.nodes
            .get(&id.0)
            .ok_or_else(|| StoreError::not_found(&format!("#{}", id.0)))
    }

    fn path_of(&self, id: u64) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            match self.nodes.get(&cur) {
                Some(node) => {
                    if node.parent.is_some() {
                        parts.push(node.name.as_str());
                    }
                    current = node.parent;
                }
                None => break,
            }
        }
        parts.reverse();
        format!("/{}", parts.join("/"))
    }

    fn entry_of(&self, id: u64) -> Option<Entry> {
        let node = self.nodes.get(&id)?;
        let name = if node.parent.is_some() {
            node.name.clone()
        } else {
            String::new()
        };
        Some(Entry::new(EntryId(id), node.kind, name, self.path_of(id)))
    }

    fn find_child(&self, dir: u64, name: &str) -> Option<u64> {
        self.nodes.get(&dir)?.children.iter().copied().find(|c| {
            self.nodes
                .get(c)
                .map(|n| n.name == name)
                .unwrap_or(false)
        })
    }

    fn insert(
        &mut self,
        parent: Option<u64>,
        name: &str,
        kind: EntryKind,
        storage: StorageType,
    ) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.nodes.insert(
            id,
            Node {
                name: name.to_string(),
                parent,
                kind,
                storage,
                data: Vec::new(),
                children: Vec::new(),
                modified: now_millis(),
            },
        );
        if let Some(parent) = parent {
            if let Some(p) = self.nodes.get_mut(&parent) {
                p.children.push(id);
                p.modified = now_millis();
            }
        }
        id
    }

    fn detach(&mut self, id: u64) {
        let parent = self.nodes.get(&id).and_then(|n| n.parent);
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.retain(|c| *c != id);
            p.modified = now_millis();
        }
    }

    fn drop_subtree(&mut self, id: u64) {
        let mut stack = vec![id];
        while let Some(cur) = stack.pop() {
            if let Some(node) = self.nodes.remove(&cur) {
                stack.extend(node.children);
            }
        }
    }

    fn is_ancestor(&self, ancestor: u64, mut id: u64) -> bool {
        loop {
            if id == ancestor {
                return true;
            }
            match self.nodes.get(&id).and_then(|n| n.parent) {
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    fn clone_subtree(&mut self, src: u64, parent: u64, name: &str) -> u64 {
        let Some(node) = self.nodes.get(&src).cloned() else {
            return 0;
        };
        let id = self.insert(Some(parent), name, node.kind, node.storage);
        if let Some(n) = self.nodes.get_mut(&id) {
            n.data = node.data;
        }
        for child in node.children {
            let child_name = match self.nodes.get(&child) {
                Some(c) => c.name.clone(),
                None => continue,
            };
            self.clone_subtree(child, id, &child_name);
        }
        id
    }

    /// Clear the way for `name` under `parent` as the target of a move or copy.
    fn prepare_target(&mut self, src: u64, parent: u64, name: &str) -> StoreResult<()> {
        let Some(existing) = self.find_child(parent, name) else {
            return Ok(());
        };
        let target_path = self.path_of(existing);
        if existing == src {
            return Err(StoreError::new(
                StoreErrorKind::InvalidModification,
                format!("Source and target are the same entry: {}", target_path),
            ));
        }
        let src_kind = self.nodes.get(&src).map(|n| n.kind);
        let (kind, empty) = match self.nodes.get(&existing) {
            Some(n) => (n.kind, n.children.is_empty()),
            None => return Ok(()),
        };
        if Some(kind) != src_kind || (kind == EntryKind::Directory && !empty) {
            return Err(StoreError::new(
                StoreErrorKind::InvalidModification,
                format!("Can not replace existing entry: {}", target_path),
            ));
        }
        self.detach(existing);
        self.drop_subtree(existing);
        Ok(())
    }

    fn used_bytes(&self, storage: StorageType) -> u64 {
        self.nodes
            .values()
            .filter(|n| n.storage == storage)
            .map(|n| n.data.len() as u64)
            .sum()
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Child names are single non-empty path segments.
fn name_required(name: &str) -> StoreResult<()> {
    if name.is_empty() || name.contains('/') {
        return Err(StoreError::new(
            StoreErrorKind::Other,
            format!("Invalid entry name: {:?}", name),
        ));
    }
    Ok(())
}

fn directory_required(arena: &Arena, dir: &Entry) -> StoreResult<()> {
    let node = arena.node(dir.id)?;
    if node.kind != EntryKind::Directory {
        return Err(StoreError::type_mismatch(&arena.path_of(dir.id.0)));
    }
    Ok(())
}

/// In-memory `EntryStore`.
#[derive(Clone)]
pub struct MemoryStore {
    arena: Arc<Mutex<Arena>>,
    page_size: usize,
    origin: String,
    capacity: u64,
    calls: Arc<AtomicUsize>,
    mutations: Arc<AtomicUsize>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let mut arena = Arena::default();
        for storage in [StorageType::Persistent, StorageType::Temporary] {
            let id = arena.insert(None, "", EntryKind::Directory, storage);
            arena.roots.insert(storage, id);
        }
        arena.granted.insert(StorageType::Temporary, DEFAULT_CAPACITY);
        Self {
            arena: Arc::new(Mutex::new(arena)),
            page_size: DEFAULT_PAGE_SIZE,
            origin: DEFAULT_ORIGIN.to_string(),
            capacity: DEFAULT_CAPACITY,
            calls: Arc::new(AtomicUsize::new(0)),
            mutations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the number of entries returned per listing page (at least 1).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Set the origin used in entry URLs.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Set the most quota this store will grant.
    pub fn with_capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self
    }

    /// Number of store primitives invoked so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of primitives that changed the tree or file content.
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn arena(&self) -> MutexGuard<'_, Arena> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.arena.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn mutated(&self) {
        self.mutations.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn get_root(&self, storage: StorageType, granted_bytes: u64) -> StoreResult<Entry> {
        let mut arena = self.arena();
        if storage == StorageType::Persistent {
            arena.granted.insert(storage, granted_bytes);
        }
        let root = arena
            .roots
            .get(&storage)
            .copied()
            .ok_or_else(|| StoreError::not_found(storage.as_str()))?;
        arena
            .entry_of(root)
            .ok_or_else(|| StoreError::not_found(storage.as_str()))
    }

    async fn get_child(
        &self,
        dir: &Entry,
        name: &str,
        kind: EntryKind,
        options: ChildOptions,
    ) -> StoreResult<Entry> {
        name_required(name)?;
        let mut arena = self.arena();
        directory_required(&arena, dir)?;
        let dir_path = arena.path_of(dir.id.0);
        let child_path = if dir_path == "/" {
            format!("/{}", name)
        } else {
            format!("{}/{}", dir_path, name)
        };

        if let Some(existing) = arena.find_child(dir.id.0, name) {
            if options.create && options.exclusive {
                return Err(StoreError::path_exists(&child_path));
            }
            let node = arena.node(EntryId(existing))?;
            if node.kind != kind {
                return Err(StoreError::type_mismatch(&child_path));
            }
            // A non-exclusive create of an existing file truncates it.
            if options.create && kind == EntryKind::File {
                if let Some(n) = arena.nodes.get_mut(&existing) {
                    n.data.clear();
                    n.modified = now_millis();
                }
                self.mutated();
            }
            return arena
                .entry_of(existing)
                .ok_or_else(|| StoreError::not_found(&child_path));
        }

        if !options.create {
            return Err(StoreError::not_found(&child_path));
        }
        let storage = arena.node(dir.id)?.storage;
        let id = arena.insert(Some(dir.id.0), name, kind, storage);
        self.mutated();
        arena
            .entry_of(id)
            .ok_or_else(|| StoreError::not_found(&child_path))
    }

    fn create_reader(&self, dir: &Entry) -> Box<dyn EntryReader> {
        Box::new(MemoryReader {
            arena: Arc::clone(&self.arena),
            calls: Arc::clone(&self.calls),
            dir: dir.id,
            pending: None,
            page_size: self.page_size,
        })
    }

    async fn metadata(&self, entry: &Entry) -> StoreResult<Metadata> {
        let arena = self.arena();
        let node = arena.node(entry.id)?;
        Ok(Metadata {
            modification_time: node.modified,
            size: match node.kind {
                EntryKind::File => node.data.len() as u64,
                EntryKind::Directory => 0,
            },
        })
    }

    async fn remove(&self, entry: &Entry) -> StoreResult<()> {
        let mut arena = self.arena();
        let node = arena.node(entry.id)?;
        if node.parent.is_none() {
            return Err(StoreError::new(
                StoreErrorKind::InvalidModification,
                "Can not remove the root directory",
            ));
        }
        if !node.children.is_empty() {
            return Err(StoreError::new(
                StoreErrorKind::InvalidModification,
                format!("Directory is not empty: {}", arena.path_of(entry.id.0)),
            ));
        }
        arena.detach(entry.id.0);
        arena.drop_subtree(entry.id.0);
        self.mutated();
        Ok(())
    }

    async fn remove_recursively(&self, dir: &Entry) -> StoreResult<()> {
        let mut arena = self.arena();
        directory_required(&arena, dir)?;
        if arena.node(dir.id)?.parent.is_none() {
            return Err(StoreError::new(
                StoreErrorKind::InvalidModification,
                "Can not remove the root directory",
            ));
        }
        arena.detach(dir.id.0);
        arena.drop_subtree(dir.id.0);
        self.mutated();
        Ok(())
    }

    async fn move_to(&self, entry: &Entry, parent: &Entry, name: &str) -> StoreResult<Entry> {
        name_required(name)?;
        let mut arena = self.arena();
        arena.node(entry.id)?;
        directory_required(&arena, parent)?;
        if arena.is_ancestor(entry.id.0, parent.id.0) {
            return Err(StoreError::new(
                StoreErrorKind::InvalidModification,
                format!(
                    "Can not move {} into itself",
                    arena.path_of(entry.id.0)
                ),
            ));
        }
        arena.prepare_target(entry.id.0, parent.id.0, name)?;
        arena.detach(entry.id.0);
        if let Some(node) = arena.nodes.get_mut(&entry.id.0) {
            node.name = name.to_string();
            node.parent = Some(parent.id.0);
            node.modified = now_millis();
        }
        if let Some(p) = arena.nodes.get_mut(&parent.id.0) {
            p.children.push(entry.id.0);
        }
        self.mutated();
        arena
            .entry_of(entry.id.0)
            .ok_or_else(|| StoreError::not_found(name))
    }

    async fn copy_to(&self, entry: &Entry, parent: &Entry, name: &str) -> StoreResult<Entry> {
        name_required(name)?;
        let mut arena = self.arena();
        arena.node(entry.id)?;
        directory_required(&arena, parent)?;
        if arena.is_ancestor(entry.id.0, parent.id.0) {
            return Err(StoreError::new(
                StoreErrorKind::InvalidModification,
                format!(
                    "Can not copy {} into itself",
                    arena.path_of(entry.id.0)
                ),
            ));
        }
        arena.prepare_target(entry.id.0, parent.id.0, name)?;
        let id = arena.clone_subtree(entry.id.0, parent.id.0, name);
        self.mutated();
        arena.entry_of(id).ok_or_else(|| StoreError::not_found(name))
    }

    fn to_url(&self, entry: &Entry) -> String {
        let arena = self.arena();
        // Stale handles keep the path they were resolved with.
        let (storage, path) = match arena.nodes.get(&entry.id.0) {
            Some(node) => (node.storage, arena.path_of(entry.id.0)),
            None => (StorageType::Persistent, entry.full_path.clone()),
        };
        format!("filesystem:{}/{}{}", self.origin, storage.as_str(), path)
    }

    async fn read(&self, file: &Entry) -> StoreResult<Vec<u8>> {
        let arena = self.arena();
        let node = arena.node(file.id)?;
        if node.kind != EntryKind::File {
            return Err(StoreError::type_mismatch(&arena.path_of(file.id.0)));
        }
        Ok(node.data.clone())
    }

    async fn write(&self, file: &Entry, data: &[u8], mode: WriteMode) -> StoreResult<()> {
        let mut arena = self.arena();
        let path = arena.path_of(file.id.0);
        let node = arena
            .nodes
            .get_mut(&file.id.0)
            .ok_or_else(|| StoreError::not_found(&path))?;
        if node.kind != EntryKind::File {
            return Err(StoreError::type_mismatch(&path));
        }
        if mode == WriteMode::Truncate {
            node.data.clear();
        }
        node.data.extend_from_slice(data);
        node.modified = now_millis();
        self.mutated();
        Ok(())
    }

    async fn request_quota(&self, storage: StorageType, bytes: u64) -> StoreResult<u64> {
        let mut arena = self.arena();
        let granted = bytes.min(self.capacity);
        arena.granted.insert(storage, granted);
        Ok(granted)
    }

    async fn query_usage(&self, storage: StorageType) -> StoreResult<Usage> {
        let arena = self.arena();
        Ok(Usage {
            used_bytes: arena.used_bytes(storage),
            granted_bytes: arena.granted.get(&storage).copied().unwrap_or(0),
        })
    }
}

/// Paginated reader over one directory of a `MemoryStore`.
///
/// Children are snapshotted on the first read; entries removed before their
/// page is served are skipped.
struct MemoryReader {
    arena: Arc<Mutex<Arena>>,
    calls: Arc<AtomicUsize>,
    dir: EntryId,
    pending: Option<Vec<u64>>,
    page_size: usize,
}

#[async_trait]
impl EntryReader for MemoryReader {
    async fn read_entries(&mut self) -> StoreResult<Vec<Entry>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let arena = self.arena.lock().unwrap_or_else(|e| e.into_inner());
        if self.pending.is_none() {
            let node = arena.node(self.dir)?;
            if node.kind != EntryKind::Directory {
                return Err(StoreError::type_mismatch(&arena.path_of(self.dir.0)));
            }
            self.pending = Some(node.children.clone());
        }
        let pending = self.pending.get_or_insert_with(Vec::new);
        let take = pending.len().min(self.page_size);
        let page: Vec<u64> = pending.drain(..take).collect();
        Ok(page.into_iter().filter_map(|id| arena.entry_of(id)).collect())
    }
}
