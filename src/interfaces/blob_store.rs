use async_trait::async_trait;
use serde_json::Value;
use crate::error::Result;

/// Key-addressed JSON documents that outlive the process.
///
/// Failures are reported as `Error::DurableStoreUnavailable`; callers decide
/// whether they matter.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// `Ok(None)` when nothing has been stored under `key` yet.
    async fn load(&self, key: &str) -> Result<Option<Value>>;

    /// Overwrites whatever is stored under `key`.
    async fn save(&self, key: &str, document: &Value) -> Result<()>;
}
