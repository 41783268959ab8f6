//! # Firebase REST clients
//!
//! | Type | Service | Implements |
//! |------|---------|------------|
//! | [`FirebaseIdentity`] | Identity Toolkit (`identitytoolkit.googleapis.com`) | [`store::IdentityService`] |
//! | [`Firestore`] | Cloud Firestore (`firestore.googleapis.com`) | [`store::DocumentStore`] |
//! | [`CloudStorage`] | Cloud Storage for Firebase (`firebasestorage.googleapis.com`) | [`store::ObjectStore`] |
//!
//! The three share one HTTP client and one [`TokenStore`]: a successful
//! sign-in stores the id token that the document and object calls then send.

pub mod codec;
mod firestore;
mod identity;
mod storage;

pub use firestore::Firestore;
pub use identity::{map_identity_error, FirebaseIdentity};
pub use storage::CloudStorage;

use serde::Deserialize;
use store::config::BackendConfig;
use store::StoreError;

use crate::tokens::TokenStore;

#[derive(Clone)]
pub struct FirebaseBackend {
    pub identity: FirebaseIdentity,
    pub documents: Firestore,
    pub objects: CloudStorage,
}

impl FirebaseBackend {
    pub fn new(config: &BackendConfig) -> Self {
        let http = reqwest::Client::new();
        let tokens = TokenStore::load();
        let bucket = if config.storage_bucket.trim().is_empty() {
            format!("{}.appspot.com", config.project_id)
        } else {
            config.storage_bucket.clone()
        };
        Self {
            identity: FirebaseIdentity::new(http.clone(), &config.api_key, tokens.clone()),
            documents: Firestore::new(http.clone(), &config.project_id, tokens.clone()),
            objects: CloudStorage::new(http, &bucket, tokens),
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

/// The `error.message` of a failed Google API response, or the status line.
pub(crate) async fn error_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.json::<ErrorEnvelope>().await {
        Ok(body) if !body.error.message.is_empty() => body.error.message,
        _ => status.to_string(),
    }
}

pub(crate) fn transport(e: reqwest::Error) -> StoreError {
    StoreError::Transport(e.to_string())
}

/// Map a failed response to a [`StoreError`]; 404 becomes `NotFound(what)`.
pub(crate) async fn store_failure(response: reqwest::Response, what: &str) -> StoreError {
    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return StoreError::NotFound(what.to_string());
    }
    StoreError::Backend(error_message(response).await)
}
