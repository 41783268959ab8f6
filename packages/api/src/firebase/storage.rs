//! Cloud Storage for Firebase client.
//!
//! Object names contain `/` (`images/u1/3f2c...`) and travel as a single
//! percent-encoded path segment (`images%2Fu1%2F3f2c...`).

use serde::Deserialize;
use store::{ObjectStore, StoreError};
use url::Url;

use super::{store_failure, transport};
use crate::tokens::TokenStore;

const STORAGE_URL: &str = "https://firebasestorage.googleapis.com/v0/b";

#[derive(Clone)]
pub struct CloudStorage {
    http: reqwest::Client,
    bucket: String,
    tokens: TokenStore,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadedObject {
    name: String,
    #[serde(default)]
    download_tokens: Option<String>,
}

impl CloudStorage {
    pub fn new(http: reqwest::Client, bucket: &str, tokens: TokenStore) -> Self {
        Self {
            http,
            bucket: bucket.to_string(),
            tokens,
        }
    }

    fn bucket_url(&self) -> String {
        format!("{STORAGE_URL}/{}/o", self.bucket)
    }

    fn object_url(&self, path: &str) -> Result<Url, StoreError> {
        let mut url =
            Url::parse(&self.bucket_url()).map_err(|e| StoreError::Malformed(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Malformed(format!("bad bucket {}", self.bucket)))?
            .push(path);
        Ok(url)
    }

    /// Public download URL of an uploaded object.
    pub fn download_url(&self, path: &str, token: &str) -> Result<String, StoreError> {
        let mut url = self.object_url(path)?;
        url.query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("token", token);
        Ok(url.to_string())
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.tokens.id_token() {
            Some(token) => request.header("Authorization", format!("Firebase {}", token)),
            None => request,
        }
    }
}

impl ObjectStore for CloudStorage {
    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StoreError> {
        let response = self
            .authorized(self.http.post(self.bucket_url()))
            .query(&[("uploadType", "media"), ("name", path)])
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(store_failure(response, path).await);
        }
        let uploaded: UploadedObject = response.json().await.map_err(transport)?;
        let token = uploaded
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                StoreError::Malformed(format!("no download token for {}", uploaded.name))
            })?;
        tracing::debug!("Uploaded {}", uploaded.name);
        self.download_url(&uploaded.name, token)
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let response = self
            .authorized(self.http.delete(self.object_url(path)?))
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(store_failure(response, path).await);
        }
        Ok(())
    }
}
