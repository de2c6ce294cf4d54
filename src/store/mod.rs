pub mod file;
pub mod http;
pub mod memory;

use std::sync::Arc;

use crate::config::{StoreConfig, StoreKind};
use crate::error::{Error, Result};
use crate::interfaces::BlobStore;

pub use file::FileBlobStore;
pub use http::HttpBlobStore;
pub use memory::MemoryBlobStore;

pub fn from_config(config: &StoreConfig) -> Result<Arc<dyn BlobStore>> {
    let store: Arc<dyn BlobStore> = match config.kind {
        StoreKind::File => Arc::new(FileBlobStore::new(&config.path)),
        StoreKind::Http => {
            let url = config.url
                .as_deref()
                .filter(|url| !url.is_empty())
                .ok_or_else(|| Error::ConfigError("store.url is required for http stores".to_string()))?;
            Arc::new(HttpBlobStore::new(url, config.token.clone(), config.timeout())?)
        }
        StoreKind::Memory => Arc::new(MemoryBlobStore::new()),
    };

    tracing::info!("Durable store: {:?}", config.kind);
    Ok(store)
}
