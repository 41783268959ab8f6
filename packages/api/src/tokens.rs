//! Persisted sign-in tokens.
//!
//! The identity service hands out a short-lived id token and a refresh token.
//! They are kept in browser `localStorage` on wasm so a reload restores the
//! session, and in memory elsewhere.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

const STORAGE_KEY: &str = "webcarros.auth";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub id_token: String,
    pub refresh_token: String,
    pub local_id: String,
}

/// Shared handle to the current tokens. Clones see the same tokens.
#[derive(Clone, Debug, Default)]
pub struct TokenStore {
    current: Arc<Mutex<Option<AuthTokens>>>,
}

impl TokenStore {
    /// Start from whatever tokens were persisted by a previous visit.
    pub fn load() -> Self {
        Self {
            current: Arc::new(Mutex::new(read_persisted())),
        }
    }

    pub fn get(&self) -> Option<AuthTokens> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn id_token(&self) -> Option<String> {
        self.get().map(|t| t.id_token)
    }

    /// Replace the tokens and persist them; `None` forgets them.
    pub fn set(&self, tokens: Option<AuthTokens>) {
        write_persisted(tokens.as_ref());
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = tokens;
    }
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

#[cfg(target_arch = "wasm32")]
fn read_persisted() -> Option<AuthTokens> {
    let raw = local_storage()?.get_item(STORAGE_KEY).ok().flatten()?;
    match serde_json::from_str(&raw) {
        Ok(tokens) => Some(tokens),
        Err(e) => {
            tracing::warn!("Ignoring unreadable stored tokens: {}", e);
            None
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn write_persisted(tokens: Option<&AuthTokens>) {
    let Some(storage) = local_storage() else {
        return;
    };
    let result = match tokens.map(serde_json::to_string) {
        Some(Ok(raw)) => storage.set_item(STORAGE_KEY, &raw),
        Some(Err(e)) => {
            tracing::error!("Failed to serialize tokens: {}", e);
            return;
        }
        None => storage.remove_item(STORAGE_KEY),
    };
    if result.is_err() {
        tracing::warn!("Failed to persist tokens under {}", STORAGE_KEY);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn read_persisted() -> Option<AuthTokens> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
fn write_persisted(_tokens: Option<&AuthTokens>) {
    tracing::trace!("Keeping tokens in memory ({})", STORAGE_KEY);
}
