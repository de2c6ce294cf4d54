use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use crate::error::Result;
use crate::interfaces::BlobStore;

/// Process-local store. Contents vanish with the process.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: DashMap<String, Value>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.blobs.get(key).map(|entry| entry.value().clone())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn load(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.get(key))
    }

    async fn save(&self, key: &str, document: &Value) -> Result<()> {
        self.blobs.insert(key.to_string(), document.clone());
        Ok(())
    }
}
