//! Session state: the store handle and the acquired root.

use std::sync::Arc;

use log::info;
use serde_json::json;

use crate::error::{FsError, Result};
use crate::fs::operations::annotate;
use crate::fs::{Entry, InitOptions, StorageType};
use crate::store::EntryStore;

/// The root of an initialized session.
#[derive(Debug, Clone)]
struct Root {
    entry: Entry,
    storage: StorageType,
    granted_bytes: u64,
}

/// A filesystem session over an entry store.
///
/// Every path operation resolves against the root acquired by [`Session::init`].
/// Until then they fail with [`FsError::Uninitialized`].
pub struct Session {
    store: Arc<dyn EntryStore>,
    root: Option<Root>,
}

impl Session {
    pub fn new(store: Arc<dyn EntryStore>) -> Self {
        Session { store, root: None }
    }

    /// Acquire the root of the requested storage area.
    ///
    /// Persistent storage asks the store for quota first (unless
    /// `request_quota` is off). Requesting bytes and being granted none is
    /// an error. A second call replaces the previous root entirely.
    pub async fn init(&mut self, options: InitOptions) -> Result<()> {
        let granted_bytes = if options.request_quota && options.storage == StorageType::Persistent
        {
            let granted = self
                .store
                .request_quota(options.storage, options.bytes)
                .await
                .map_err(annotate(
                    "request_quota",
                    json!([options.storage, options.bytes]),
                ))?;
            if options.bytes > 0 && granted == 0 {
                return Err(FsError::QuotaNotGranted {
                    requested: options.bytes,
                    granted,
                });
            }
            granted
        } else {
            options.bytes
        };

        let entry = self
            .store
            .get_root(options.storage, granted_bytes)
            .await
            .map_err(annotate("get_root", json!([options.storage, granted_bytes])))?;
        info!(
            "initialized {} storage ({} bytes granted)",
            options.storage.as_str(),
            granted_bytes
        );
        self.root = Some(Root {
            entry,
            storage: options.storage,
            granted_bytes,
        });
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.root.is_some()
    }

    /// The root directory entry.
    pub fn root_entry(&self) -> Result<&Entry> {
        self.root
            .as_ref()
            .map(|root| &root.entry)
            .ok_or(FsError::Uninitialized)
    }

    pub fn storage_type(&self) -> Result<StorageType> {
        self.root
            .as_ref()
            .map(|root| root.storage)
            .ok_or(FsError::Uninitialized)
    }

    /// Bytes granted when the session was initialized.
    pub fn granted_bytes(&self) -> Result<u64> {
        self.root
            .as_ref()
            .map(|root| root.granted_bytes)
            .ok_or(FsError::Uninitialized)
    }

    pub(crate) fn store(&self) -> &dyn EntryStore {
        self.store.as_ref()
    }
}
