//! Identity Toolkit client.
//!
//! Sign-in state changes are fanned out through an [`IdentityBroadcaster`].
//! `restore` verifies persisted tokens with `accounts:lookup`, refreshing an
//! expired id token once through the secure token endpoint.

use std::sync::{Arc, Mutex, PoisonError};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use store::{Identity, IdentityBroadcaster, IdentityError, IdentityService, Subscription};

use super::error_message;
use crate::tokens::{AuthTokens, TokenStore};

const IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const SECURE_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/token";

#[derive(Default)]
struct State {
    current: Option<Identity>,
    resolved: bool,
}

#[derive(Clone)]
pub struct FirebaseIdentity {
    http: reqwest::Client,
    api_key: String,
    tokens: TokenStore,
    state: Arc<Mutex<State>>,
    broadcaster: IdentityBroadcaster,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

impl AccountResponse {
    fn identity(&self) -> Identity {
        Identity {
            id: self.local_id.clone(),
            display_name: self.display_name.clone().filter(|n| !n.is_empty()),
            email: self.email.clone(),
        }
    }

    fn tokens(&self) -> Option<AuthTokens> {
        Some(AuthTokens {
            id_token: self.id_token.clone()?,
            refresh_token: self.refresh_token.clone()?,
            local_id: self.local_id.clone(),
        })
    }
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<AccountResponse>,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    user_id: String,
}

/// Map an Identity Toolkit error message (`"WEAK_PASSWORD : Password should
/// be at least 6 characters"`) to an [`IdentityError`].
pub fn map_identity_error(message: &str) -> IdentityError {
    let code = message
        .split(|c: char| c == ' ' || c == ':')
        .next()
        .unwrap_or(message);
    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            IdentityError::InvalidCredentials
        }
        "EMAIL_EXISTS" => IdentityError::AccountExists,
        "WEAK_PASSWORD" => IdentityError::WeakPassword,
        _ => IdentityError::Rejected(message.to_string()),
    }
}

fn transport(e: reqwest::Error) -> IdentityError {
    IdentityError::Transport(e.to_string())
}

impl FirebaseIdentity {
    pub fn new(http: reqwest::Client, api_key: &str, tokens: TokenStore) -> Self {
        Self {
            http,
            api_key: api_key.to_string(),
            tokens,
            state: Arc::default(),
            broadcaster: IdentityBroadcaster::new(),
        }
    }

    async fn call<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<R, IdentityError> {
        let response = self
            .http
            .post(format!("{IDENTITY_URL}/accounts:{endpoint}"))
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(map_identity_error(&error_message(response).await));
        }
        response.json().await.map_err(transport)
    }

    async fn password_call(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, IdentityError> {
        let account: AccountResponse = self
            .call(
                endpoint,
                json!({ "email": email.trim(), "password": password, "returnSecureToken": true }),
            )
            .await?;
        self.tokens.set(account.tokens());
        let identity = account.identity();
        self.settle(Some(identity.clone()));
        Ok(identity)
    }

    async fn lookup(&self, id_token: &str) -> Result<Identity, IdentityError> {
        let found: LookupResponse = self.call("lookup", json!({ "idToken": id_token })).await?;
        found
            .users
            .first()
            .map(AccountResponse::identity)
            .ok_or_else(|| IdentityError::Rejected("USER_NOT_FOUND".to_string()))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthTokens, IdentityError> {
        let response = self
            .http
            .post(SECURE_TOKEN_URL)
            .query(&[("key", self.api_key.as_str())])
            .form(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(map_identity_error(&error_message(response).await));
        }
        let refreshed: RefreshResponse = response.json().await.map_err(transport)?;
        Ok(AuthTokens {
            id_token: refreshed.id_token,
            refresh_token: refreshed.refresh_token,
            local_id: refreshed.user_id,
        })
    }

    /// Resolve the persisted tokens into the signed-in identity, if any.
    async fn resolve_persisted(&self) -> Option<Identity> {
        let tokens = self.tokens.get()?;
        match self.lookup(&tokens.id_token).await {
            Ok(identity) => return Some(identity),
            Err(IdentityError::Transport(e)) => {
                tracing::warn!("Could not verify stored session: {}", e);
                return None;
            }
            Err(e) => tracing::debug!("Stored id token rejected: {}", e),
        }

        let refreshed = match self.refresh(&tokens.refresh_token).await {
            Ok(refreshed) => refreshed,
            Err(e) => {
                tracing::info!("Stored session expired: {}", e);
                self.tokens.set(None);
                return None;
            }
        };
        self.tokens.set(Some(refreshed.clone()));
        match self.lookup(&refreshed.id_token).await {
            Ok(identity) => Some(identity),
            Err(e) => {
                tracing::warn!("Could not restore session: {}", e);
                None
            }
        }
    }

    fn settle(&self, event: Option<Identity>) {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.current = event.clone();
            state.resolved = true;
        }
        self.broadcaster.publish(event);
    }
}

impl IdentityService for FirebaseIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        self.password_call("signInWithPassword", email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        self.password_call("signUp", email, password).await
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        self.tokens.set(None);
        self.settle(None);
        Ok(())
    }

    async fn update_display_name(
        &self,
        identity: &Identity,
        name: &str,
    ) -> Result<Identity, IdentityError> {
        let id_token = self
            .tokens
            .id_token()
            .ok_or_else(|| IdentityError::Rejected("not signed in".to_string()))?;
        let account: AccountResponse = self
            .call(
                "update",
                json!({ "idToken": id_token, "displayName": name, "returnSecureToken": false }),
            )
            .await?;

        let updated = Identity {
            id: identity.id.clone(),
            display_name: Some(name.to_string()),
            email: account.email.or_else(|| identity.email.clone()),
        };
        let is_current = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .current
            .as_ref()
            .is_some_and(|c| c.id == updated.id);
        if is_current {
            self.settle(Some(updated.clone()));
        }
        Ok(updated)
    }

    fn subscribe(&self) -> Subscription {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let initial = state.resolved.then(|| state.current.clone());
        self.broadcaster.subscribe_with(initial)
    }

    async fn restore(&self) {
        if self.state.lock().unwrap_or_else(PoisonError::into_inner).resolved {
            return;
        }
        let identity = self.resolve_persisted().await;
        // A sign-in or sign-out while the lookup was in flight wins.
        if self.state.lock().unwrap_or_else(PoisonError::into_inner).resolved {
            return;
        }
        self.settle(identity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_map_to_identity_errors() {
        assert_eq!(
            map_identity_error("INVALID_LOGIN_CREDENTIALS"),
            IdentityError::InvalidCredentials
        );
        assert_eq!(map_identity_error("EMAIL_NOT_FOUND"), IdentityError::InvalidCredentials);
        assert_eq!(map_identity_error("EMAIL_EXISTS"), IdentityError::AccountExists);
        assert_eq!(
            map_identity_error("WEAK_PASSWORD : Password should be at least 6 characters"),
            IdentityError::WeakPassword
        );
        assert_eq!(
            map_identity_error("TOO_MANY_ATTEMPTS_TRY_LATER"),
            IdentityError::Rejected("TOO_MANY_ATTEMPTS_TRY_LATER".into())
        );
    }

    #[test]
    fn test_account_response_without_display_name() {
        let account: AccountResponse = serde_json::from_value(json!({
            "localId": "u1",
            "email": "ana@x.com",
            "displayName": "",
            "idToken": "id",
            "refreshToken": "refresh"
        }))
        .unwrap();
        let identity = account.identity();
        assert_eq!(identity.display_name, None);
        assert_eq!(identity.email.as_deref(), Some("ana@x.com"));
        assert_eq!(account.tokens().unwrap().local_id, "u1");
    }

    #[tokio::test]
    async fn test_sign_out_notifies_subscribers() {
        let service = FirebaseIdentity::new(reqwest::Client::new(), "key", TokenStore::default());
        let mut sub = service.subscribe();
        service.sign_out().await.unwrap();
        assert_eq!(sub.try_recv(), Some(None));

        let mut late = service.subscribe();
        assert_eq!(late.try_recv(), Some(None));
    }

    #[tokio::test]
    async fn test_restore_without_tokens_resolves_signed_out() {
        let service = FirebaseIdentity::new(reqwest::Client::new(), "key", TokenStore::default());
        let mut sub = service.subscribe();
        assert_eq!(sub.try_recv(), None);
        service.restore().await;
        assert_eq!(sub.try_recv(), Some(None));
    }
}
