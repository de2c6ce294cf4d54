use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    File,
    Http,
    Memory,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,
    /// Directory for `file` stores.
    pub path: PathBuf,
    /// Base URL for `http` stores; blobs live at `{url}/{key}`.
    pub url: Option<String>,
    pub token: Option<String>,
    pub cache_key: String,
    /// Per-request limit for `http` stores.
    pub timeout_secs: u64,
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            kind: StoreKind::File,
            path: PathBuf::from("data"),
            url: None,
            token: None,
            cache_key: crate::DURABLE_CACHE_KEY.to_string(),
            timeout_secs: 10,
        }
    }
}
