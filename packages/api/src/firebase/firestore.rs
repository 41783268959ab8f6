//! Cloud Firestore client over the v1 REST API.

use serde::Deserialize;
use store::{Document, DocumentStore, Query, Record, StoreError};
use url::Url;

use super::codec;
use super::{store_failure, transport};
use crate::tokens::TokenStore;

const FIRESTORE_URL: &str = "https://firestore.googleapis.com/v1";

#[derive(Clone)]
pub struct Firestore {
    http: reqwest::Client,
    project_id: String,
    tokens: TokenStore,
}

#[derive(Deserialize)]
struct RunQueryItem {
    #[serde(default)]
    document: Option<serde_json::Value>,
}

impl Firestore {
    pub fn new(http: reqwest::Client, project_id: &str, tokens: TokenStore) -> Self {
        Self {
            http,
            project_id: project_id.to_string(),
            tokens,
        }
    }

    /// Resource name of the database's document root.
    fn root(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    fn url(&self, suffix: &str) -> String {
        format!("{FIRESTORE_URL}/{}{suffix}", self.root())
    }

    /// URL of one document. The id is encoded as a single path segment.
    fn document_url(&self, collection: &str, id: &str) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.url("")).map_err(|e| StoreError::Malformed(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Malformed(format!("bad project {}", self.project_id)))?
            .push(collection)
            .push(id);
        Ok(url)
    }

    // TODO: refresh the id token and retry once when Firestore answers 401.
    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.tokens.id_token() {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }
}

impl DocumentStore for Firestore {
    async fn insert(&self, collection: &str, record: Record) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        let name = format!("{}/{collection}/{id}", self.root());
        let response = self
            .authorized(self.http.post(self.url(":commit")))
            .json(&codec::commit_body(&name, &record))
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(store_failure(response, &name).await);
        }
        tracing::debug!("Committed {}", name);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let response = self
            .authorized(self.http.get(self.document_url(collection, id)?))
            .send()
            .await
            .map_err(transport)?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(store_failure(response, id).await);
        }
        let raw: serde_json::Value = response.json().await.map_err(transport)?;
        codec::decode_document(&raw).map(Some)
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let response = self
            .authorized(self.http.post(self.url(":runQuery")))
            .json(&codec::structured_query(collection, query))
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(store_failure(response, collection).await);
        }
        let items: Vec<RunQueryItem> = response.json().await.map_err(transport)?;
        Ok(decode_items(&items))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let response = self
            .authorized(self.http.delete(self.document_url(collection, id)?))
            .send()
            .await
            .map_err(transport)?;
        if !response.status().is_success() {
            return Err(store_failure(response, id).await);
        }
        Ok(())
    }
}

/// Decode the documents of a `runQuery` answer, skipping undecodable ones.
fn decode_items(items: &[RunQueryItem]) -> Vec<Document> {
    items
        .iter()
        .filter_map(|item| item.document.as_ref())
        .filter_map(|raw| match codec::decode_document(raw) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!("Skipping document: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let store = Firestore::new(reqwest::Client::new(), "webcarros", TokenStore::default());
        assert_eq!(
            store.url(":runQuery"),
            "https://firestore.googleapis.com/v1/projects/webcarros/databases/(default)/documents:runQuery"
        );
        assert_eq!(
            store.url("/cars/abc"),
            "https://firestore.googleapis.com/v1/projects/webcarros/databases/(default)/documents/cars/abc"
        );
    }

    #[test]
    fn test_run_query_items_without_document_are_skipped() {
        let items: Vec<RunQueryItem> =
            serde_json::from_str(r#"[{"readTime":"2024-01-01T00:00:00Z"}]"#).unwrap();
        assert!(items[0].document.is_none());
    }

    #[test]
    fn test_document_url_keeps_id_in_one_segment() {
        let store = Firestore::new(reqwest::Client::new(), "webcarros", TokenStore::default());
        assert_eq!(
            store.document_url("cars", "abc").unwrap().as_str(),
            "https://firestore.googleapis.com/v1/projects/webcarros/databases/(default)/documents/cars/abc"
        );
        let url = store.document_url("cars", "a/b?c#d").unwrap();
        assert!(url.as_str().ends_with("/documents/cars/a%2Fb%3Fc%23d"));
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_undecodable_documents_are_skipped() {
        let items: Vec<RunQueryItem> = serde_json::from_str(
            r#"[
                {"document": {
                    "name": "projects/p/databases/(default)/documents/cars/ok",
                    "fields": {"name": {"stringValue": "ONIX"}}
                }},
                {"document": {
                    "name": "projects/p/databases/(default)/documents/cars/bad",
                    "fields": {"x": {"mysteryValue": 1}}
                }},
                {"readTime": "2024-01-01T00:00:00Z"}
            ]"#,
        )
        .unwrap();
        let docs = decode_items(&items);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "ok");
    }
}
