//! The hosted backend or the in-memory demo, behind one type.

use store::config::CatalogConfig;
use store::{
    Document, DocumentStore, Identity, IdentityError, IdentityService, Marketplace,
    MemoryBackend, ObjectStore, Query, Record, StoreError, Subscription, WebCarrosConfig,
};
use thiserror::Error;

use crate::firebase::FirebaseBackend;

/// Account available on the demo backend.
pub const DEMO_EMAIL: &str = "demo@webcarros.dev";
pub const DEMO_PASSWORD: &str = "webcarros";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(String),
    #[error("backend configuration is missing {0}")]
    Incomplete(&'static str),
}

#[derive(Clone)]
enum Inner {
    Firebase(FirebaseBackend),
    Memory(MemoryBackend),
}

/// Identity service, document store and object store of the running app.
#[derive(Clone)]
pub struct Backend {
    inner: Inner,
    catalog: CatalogConfig,
    guard_timeout_secs: u32,
}

impl Backend {
    /// Parse a `webcarros.toml` file and build the backend it describes.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        let config =
            WebCarrosConfig::from_toml(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_config(&config)
    }

    pub fn from_config(config: &WebCarrosConfig) -> Result<Self, ConfigError> {
        let backend = &config.backend;
        let inner = if config.is_configured() {
            tracing::info!("Using Firebase project {}", backend.project_id);
            Inner::Firebase(FirebaseBackend::new(backend))
        } else {
            match (backend.api_key.trim().is_empty(), backend.project_id.trim().is_empty()) {
                (true, true) => {
                    tracing::info!("No backend configured, running the demo backend");
                    Inner::Memory(demo_memory())
                }
                (false, _) => return Err(ConfigError::Incomplete("backend.project_id")),
                (true, false) => return Err(ConfigError::Incomplete("backend.api_key")),
            }
        };
        Ok(Self {
            inner,
            catalog: config.catalog.clone(),
            guard_timeout_secs: config.session.guard_timeout_secs,
        })
    }

    /// The in-memory demo backend with its demo account.
    pub fn demo() -> Self {
        Self::memory(demo_memory())
    }

    /// Wrap existing in-memory collaborators.
    pub fn memory(memory: MemoryBackend) -> Self {
        let defaults = WebCarrosConfig::default();
        Self {
            inner: Inner::Memory(memory),
            catalog: defaults.catalog,
            guard_timeout_secs: defaults.session.guard_timeout_secs,
        }
    }

    pub fn is_demo(&self) -> bool {
        matches!(self.inner, Inner::Memory(_))
    }

    pub fn catalog(&self) -> &CatalogConfig {
        &self.catalog
    }

    pub fn guard_timeout_secs(&self) -> u32 {
        self.guard_timeout_secs
    }

    /// Listing workflows running against this backend.
    pub fn marketplace(&self) -> Marketplace<Backend, Backend> {
        Marketplace::new(self.clone(), self.clone()).with_catalog(self.catalog.clone())
    }
}

fn demo_memory() -> MemoryBackend {
    let memory = MemoryBackend::new();
    MemoryBackend {
        identity: memory
            .identity
            .with_account(DEMO_EMAIL, DEMO_PASSWORD, Some("Demo")),
        ..memory
    }
}

impl IdentityService for Backend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        match &self.inner {
            Inner::Firebase(f) => f.identity.sign_in(email, password).await,
            Inner::Memory(m) => m.identity.sign_in(email, password).await,
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        match &self.inner {
            Inner::Firebase(f) => f.identity.sign_up(email, password).await,
            Inner::Memory(m) => m.identity.sign_up(email, password).await,
        }
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        match &self.inner {
            Inner::Firebase(f) => f.identity.sign_out().await,
            Inner::Memory(m) => m.identity.sign_out().await,
        }
    }

    async fn update_display_name(
        &self,
        identity: &Identity,
        name: &str,
    ) -> Result<Identity, IdentityError> {
        match &self.inner {
            Inner::Firebase(f) => f.identity.update_display_name(identity, name).await,
            Inner::Memory(m) => m.identity.update_display_name(identity, name).await,
        }
    }

    fn subscribe(&self) -> Subscription {
        match &self.inner {
            Inner::Firebase(f) => f.identity.subscribe(),
            Inner::Memory(m) => m.identity.subscribe(),
        }
    }

    async fn restore(&self) {
        match &self.inner {
            Inner::Firebase(f) => f.identity.restore().await,
            Inner::Memory(m) => m.identity.restore().await,
        }
    }
}

impl DocumentStore for Backend {
    async fn insert(&self, collection: &str, record: Record) -> Result<String, StoreError> {
        match &self.inner {
            Inner::Firebase(f) => f.documents.insert(collection, record).await,
            Inner::Memory(m) => m.documents.insert(collection, record).await,
        }
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        match &self.inner {
            Inner::Firebase(f) => f.documents.get(collection, id).await,
            Inner::Memory(m) => m.documents.get(collection, id).await,
        }
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        match &self.inner {
            Inner::Firebase(f) => f.documents.query(collection, query).await,
            Inner::Memory(m) => m.documents.query(collection, query).await,
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        match &self.inner {
            Inner::Firebase(f) => f.documents.delete(collection, id).await,
            Inner::Memory(m) => m.documents.delete(collection, id).await,
        }
    }
}

impl ObjectStore for Backend {
    async fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StoreError> {
        match &self.inner {
            Inner::Firebase(f) => f.objects.upload(path, content_type, bytes).await,
            Inner::Memory(m) => m.objects.upload(path, content_type, bytes).await,
        }
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        match &self.inner {
            Inner::Firebase(f) => f.objects.delete(path).await,
            Inner::Memory(m) => m.objects.delete(path).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::{ListingForm, SessionHolder};

    #[test]
    fn test_empty_config_runs_demo() {
        let backend = Backend::from_toml("").unwrap();
        assert!(backend.is_demo());
        assert_eq!(backend.guard_timeout_secs(), 10);
        assert_eq!(backend.catalog().collection, "cars");
    }

    #[test]
    fn test_half_configured_backend_is_rejected() {
        let result = Backend::from_toml("[backend]\napi_key = \"key\"\n");
        assert!(matches!(
            result,
            Err(ConfigError::Incomplete("backend.project_id"))
        ));
        assert!(matches!(
            Backend::from_toml("[backend]\nproject_id = \"webcarros\"\n"),
            Err(ConfigError::Incomplete("backend.api_key"))
        ));
        assert!(matches!(
            Backend::from_toml("[backend\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_configured_backend_uses_firebase() {
        let backend = Backend::from_toml(
            "[backend]\napi_key = \"key\"\nproject_id = \"webcarros\"\n[session]\nguard_timeout_secs = 3\n",
        )
        .unwrap();
        assert!(!backend.is_demo());
        assert_eq!(backend.guard_timeout_secs(), 3);
    }

    #[tokio::test]
    async fn test_demo_account_signs_in_and_reaches_session() {
        let backend = Backend::demo();
        let mut holder = SessionHolder::attach(&backend);

        let identity = backend.sign_in(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
        assert_eq!(identity.label(), "Demo");

        let session = holder.next().await.unwrap();
        assert_eq!(session.identity.as_ref(), Some(&identity));
    }

    #[tokio::test]
    async fn test_marketplace_over_demo_backend() {
        let backend = Backend::demo();
        let owner = backend.sign_in(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
        let market = backend.marketplace();

        let photo = market
            .upload_photo(&owner, "image/png", vec![1, 2, 3], "blob:x".into())
            .await
            .unwrap();
        assert!(photo.remote_url.starts_with("data:image/png;base64,"));

        let form = ListingForm {
            name: "civic".into(),
            model: "EXL".into(),
            year: "2020".into(),
            km: "15000".into(),
            price: "120000".into(),
            city: "Recife".into(),
            phone: "81987654321".into(),
            description: "Garage kept, never crashed".into(),
        };
        let id = market.create(&owner, &form, &[photo]).await.unwrap();
        let owned = market.owned_by(&owner.id).await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].id, id);
        assert_eq!(market.search("CIV").await.unwrap().len(), 1);
    }
}
