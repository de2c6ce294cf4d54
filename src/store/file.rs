use std::path::{Path, PathBuf};
use async_trait::async_trait;
use serde_json::Value;
use tokio::fs as async_fs;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::interfaces::BlobStore;

/// One JSON file per key under `dir`.
///
/// Writes go to a uniquely named temp file first and are renamed into place,
/// so a reader sees either the old or the new document. Concurrent writers are
/// not coordinated; the last rename wins.
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        FileBlobStore {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\']);
        if !valid {
            return Err(Error::DurableStoreUnavailable(format!("invalid blob key: {:?}", key)));
        }
        Ok(self.dir.join(key))
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn load(&self, key: &str) -> Result<Option<Value>> {
        let path = self.path_for(key)?;

        let data = match async_fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(Error::DurableStoreUnavailable(format!("read {:?}: {}", path, e)));
            }
        };

        let document = serde_json::from_slice(&data)
            .map_err(|e| Error::DurableStoreUnavailable(format!("parse {:?}: {}", path, e)))?;
        Ok(Some(document))
    }

    async fn save(&self, key: &str, document: &Value) -> Result<()> {
        let path = self.path_for(key)?;

        async_fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::DurableStoreUnavailable(format!("create {:?}: {}", self.dir, e)))?;

        let data = serde_json::to_vec(document)
            .map_err(|e| Error::DurableStoreUnavailable(e.to_string()))?;

        let tmp = self.dir.join(format!(".{}.{}.tmp", key, Uuid::new_v4()));
        async_fs::write(&tmp, data)
            .await
            .map_err(|e| Error::DurableStoreUnavailable(format!("write {:?}: {}", tmp, e)))?;

        if let Err(e) = async_fs::rename(&tmp, &path).await {
            let _ = async_fs::remove_file(&tmp).await;
            return Err(Error::DurableStoreUnavailable(format!("rename to {:?}: {}", path, e)));
        }

        tracing::debug!("Saved blob {:?}", path);
        Ok(())
    }
}
