//! # Application configuration: `webcarros.toml`
//!
//! The web build embeds `webcarros.toml` and parses it at startup
//! (filename: [`WebCarrosConfig::filename`]).
//!
//! ## Structure
//!
//! ```toml
//! [backend]
//! api_key = ""              # empty = in-memory demo backend
//! project_id = "webcarros"
//! storage_bucket = "webcarros.appspot.com"
//!
//! [session]
//! guard_timeout_secs = 10   # 0 waits for the identity service indefinitely
//!
//! [catalog]
//! collection = "cars"
//! image_root = "images"
//! ```
//!
//! Every section and field has a default, so a missing or empty file is the
//! default configuration: the demo backend with a 10 second guard timeout.

use serde::{Deserialize, Serialize};

/// Top-level configuration stored in `webcarros.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WebCarrosConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Hosted backend project settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub storage_bucket: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long a guarded route waits for the first identity event. 0 disables
    /// the timeout.
    #[serde(default = "default_guard_timeout")]
    pub guard_timeout_secs: u32,
}

fn default_guard_timeout() -> u32 {
    10
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            guard_timeout_secs: default_guard_timeout(),
        }
    }
}

/// Where listings and their photos are kept.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_image_root")]
    pub image_root: String,
}

fn default_collection() -> String {
    "cars".to_string()
}

fn default_image_root() -> String {
    "images".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            image_root: default_image_root(),
        }
    }
}

impl WebCarrosConfig {
    /// Builder method to point at a hosted backend project.
    pub fn with_backend(mut self, api_key: &str, project_id: &str, storage_bucket: &str) -> Self {
        self.backend = BackendConfig {
            api_key: api_key.to_string(),
            project_id: project_id.to_string(),
            storage_bucket: storage_bucket.to_string(),
        };
        self
    }

    /// Builder method to set the route guard timeout.
    pub fn with_guard_timeout(mut self, secs: u32) -> Self {
        self.session.guard_timeout_secs = secs;
        self
    }

    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "webcarros.toml"
    }

    /// Whether a hosted backend is configured. Otherwise the demo backend runs.
    pub fn is_configured(&self) -> bool {
        !self.backend.api_key.trim().is_empty() && !self.backend.project_id.trim().is_empty()
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default_demo_config() {
        let config = WebCarrosConfig::from_toml("").unwrap();
        assert_eq!(config, WebCarrosConfig::default());
        assert!(!config.is_configured());
        assert_eq!(config.session.guard_timeout_secs, 10);
        assert_eq!(config.catalog.collection, "cars");
        assert_eq!(config.catalog.image_root, "images");
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = WebCarrosConfig::from_toml(
            r#"
            [backend]
            api_key = "key"
            project_id = "webcarros"

            [session]
            guard_timeout_secs = 0
            "#,
        )
        .unwrap();
        assert!(config.is_configured());
        assert_eq!(config.backend.storage_bucket, "");
        assert_eq!(config.session.guard_timeout_secs, 0);
        assert_eq!(config.catalog.collection, "cars");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = WebCarrosConfig::default()
            .with_backend("key", "proj", "proj.appspot.com")
            .with_guard_timeout(5);
        let parsed = WebCarrosConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
