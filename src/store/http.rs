use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::interfaces::BlobStore;

/// URL-addressed blobs: `GET {base}/{key}` reads, `PUT {base}/{key}` overwrites.
pub struct HttpBlobStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpBlobStore {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::ConfigError(format!("blob store client: {}", e)))?;

        Ok(HttpBlobStore {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
        })
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn unavailable(context: &str, e: impl std::fmt::Display) -> Error {
    Error::DurableStoreUnavailable(format!("{}: {}", context, e))
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn load(&self, key: &str) -> Result<Option<Value>> {
        let url = self.url_for(key);
        let response = self.authorize(self.client.get(&url))
            .send()
            .await
            .map_err(|e| unavailable(&url, e))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let document = response.json::<Value>()
                    .await
                    .map_err(|e| unavailable(&url, e))?;
                Ok(Some(document))
            }
            status => Err(unavailable(&url, format!("status {}", status))),
        }
    }

    async fn save(&self, key: &str, document: &Value) -> Result<()> {
        let url = self.url_for(key);
        let response = self.authorize(self.client.put(&url))
            .json(document)
            .send()
            .await
            .map_err(|e| unavailable(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unavailable(&url, format!("status {}", status)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_load_missing_blob() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blobs/ratios-cache.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = HttpBlobStore::new(&format!("{}/blobs/", server.uri()), None, TIMEOUT).unwrap();
        assert_eq!(store.load("ratios-cache.json").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_load_existing_blob() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ratios-cache.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "SNEK": [] })))
            .mount(&server)
            .await;

        let store = HttpBlobStore::new(&server.uri(), None, TIMEOUT).unwrap();
        assert_eq!(store.load("ratios-cache.json").await.unwrap(), Some(json!({ "SNEK": [] })));
    }

    #[tokio::test]
    async fn test_save_puts_with_token() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/ratios-cache.json"))
            .and(header("authorization", "Bearer blob-token"))
            .and(body_json(json!({ "SNEK": [] })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let store = HttpBlobStore::new(&server.uri(), Some("blob-token".to_string()), TIMEOUT).unwrap();
        store.save("ratios-cache.json", &json!({ "SNEK": [] })).await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let store = HttpBlobStore::new(&server.uri(), None, TIMEOUT).unwrap();
        let err = store.load("ratios-cache.json").await.unwrap_err();
        assert!(matches!(err, Error::DurableStoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_hung_store_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let store = HttpBlobStore::new(&server.uri(), None, Duration::from_millis(100)).unwrap();
        let err = store.load("ratios-cache.json").await.unwrap_err();
        assert!(matches!(err, Error::DurableStoreUnavailable(_)));
    }
}
