//! Storage quota operations.

use serde_json::json;

use super::annotate;
use crate::error::Result;
use crate::fs::Usage;
use crate::session::Session;

impl Session {
    /// Get used and granted bytes of the session's storage area.
    pub async fn usage(&self) -> Result<Usage> {
        let storage = self.storage_type()?;
        self.store()
            .query_usage(storage)
            .await
            .map_err(annotate("query_usage_and_quota", json!([storage])))
    }
}
