//! # Listing service
//!
//! [`Marketplace`] runs every listing workflow against a [`DocumentStore`] and
//! an [`ObjectStore`]:
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`recent`](Marketplace::recent) | All listings, newest first. |
//! | [`search`](Marketplace::search) | Name prefix search; an empty input falls back to `recent`. |
//! | [`owned_by`](Marketplace::owned_by) | Listings of one owner. |
//! | [`get`](Marketplace::get) | One listing by id. |
//! | [`create`](Marketplace::create) | Validate a form and insert it with its uploaded photos. |
//! | [`delete`](Marketplace::delete) | Best-effort photo cleanup, then delete the document. |
//! | [`upload_photo`](Marketplace::upload_photo) / [`discard_photo`](Marketplace::discard_photo) | Manage the pending photos of the creation form. |
//!
//! Stored documents that do not map into a [`Listing`] are skipped with a
//! warning rather than failing the whole read.

use crate::config::CatalogConfig;
use crate::documents::{Direction, Document, DocumentStore, Filter, Query, Record};
use crate::error::{ListingError, StoreError};
use crate::models::{Identity, Listing, PendingPhoto};
use crate::objects::{is_accepted_image, photo_path, ObjectStore};
use crate::validation::ListingForm;

/// Upper bound appended to a prefix so a range filter matches every string
/// starting with it.
const PREFIX_END: char = '\u{f8ff}';

/// Outcome of a delete whose document removal succeeded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeleteReport {
    /// Object paths whose delete failed and were left behind.
    pub failed_photos: Vec<String>,
}

impl DeleteReport {
    pub fn is_clean(&self) -> bool {
        self.failed_photos.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct Marketplace<D, O> {
    documents: D,
    objects: O,
    catalog: CatalogConfig,
}

impl<D: DocumentStore, O: ObjectStore> Marketplace<D, O> {
    pub fn new(documents: D, objects: O) -> Self {
        Self {
            documents,
            objects,
            catalog: CatalogConfig::default(),
        }
    }

    /// Builder method to use another collection or image folder.
    pub fn with_catalog(mut self, catalog: CatalogConfig) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn catalog(&self) -> &CatalogConfig {
        &self.catalog
    }

    pub async fn recent(&self) -> Result<Vec<Listing>, StoreError> {
        let query = Query::new().order_by("created", Direction::Descending);
        self.run(&query).await
    }

    /// Listings whose upper-cased name starts with the upper-cased input,
    /// ordered by name.
    pub async fn search(&self, input: &str) -> Result<Vec<Listing>, StoreError> {
        let prefix = input.trim().to_uppercase();
        if prefix.is_empty() {
            return self.recent().await;
        }
        let query = Query::new()
            .filter(Filter::ge("name", prefix.as_str()))
            .filter(Filter::le("name", format!("{prefix}{PREFIX_END}")))
            .order_by("name", Direction::Ascending);
        self.run(&query).await
    }

    pub async fn owned_by(&self, owner_id: &str) -> Result<Vec<Listing>, StoreError> {
        let query = Query::new().filter(Filter::eq("owner.uid", owner_id));
        self.run(&query).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Listing>, StoreError> {
        match self.documents.get(&self.catalog.collection, id).await? {
            Some(doc) => Listing::from_document(doc).map(Some),
            None => Ok(None),
        }
    }

    /// Validate `form` and insert it as a listing owned by `owner` with
    /// `photos` attached. Nothing is written when validation fails or no photo
    /// was uploaded. Returns the new document id.
    pub async fn create(
        &self,
        owner: &Identity,
        form: &ListingForm,
        photos: &[PendingPhoto],
    ) -> Result<String, ListingError> {
        let draft = form.parse().map_err(ListingError::Validation)?;
        if photos.is_empty() {
            return Err(ListingError::NoPhotos);
        }

        let listing = Listing {
            id: String::new(),
            name: draft.name,
            model: draft.model,
            description: draft.description,
            year: draft.year,
            price: draft.price,
            city: draft.city,
            odometer_km: draft.odometer_km,
            phone: draft.phone,
            owner: owner.clone(),
            photos: photos.iter().map(PendingPhoto::to_listing_photo).collect(),
            created: None,
        };
        let record = Record::from_serialize(&listing)?.with_server_timestamp("created");
        let id = self.documents.insert(&self.catalog.collection, record).await?;
        tracing::info!("Created listing {} with {} photos", id, photos.len());
        Ok(id)
    }

    /// Delete every photo of `listing` (failures are collected, not fatal),
    /// then its document.
    pub async fn delete(&self, listing: &Listing) -> Result<DeleteReport, StoreError> {
        let mut report = DeleteReport::default();
        for photo in &listing.photos {
            let path = photo_path(&self.catalog.image_root, &listing.owner.id, &photo.name);
            if let Err(e) = self.objects.delete(&path).await {
                tracing::warn!("Failed to delete photo {}: {}", path, e);
                report.failed_photos.push(path);
            }
        }
        self.documents
            .delete(&self.catalog.collection, &listing.id)
            .await?;
        Ok(report)
    }

    /// Upload a photo for the creation form of `owner`. Only JPEG and PNG are
    /// accepted.
    pub async fn upload_photo(
        &self,
        owner: &Identity,
        content_type: &str,
        bytes: Vec<u8>,
        preview_url: String,
    ) -> Result<PendingPhoto, ListingError> {
        if !is_accepted_image(content_type) {
            return Err(ListingError::UnsupportedImage(content_type.to_string()));
        }
        let storage_name = uuid::Uuid::new_v4().to_string();
        let path = photo_path(&self.catalog.image_root, &owner.id, &storage_name);
        let remote_url = self.objects.upload(&path, content_type, bytes).await?;
        Ok(PendingPhoto {
            owner_id: owner.id.clone(),
            storage_name,
            preview_url,
            remote_url,
        })
    }

    /// Delete a pending photo from object storage. On error the caller keeps
    /// the photo in the form.
    pub async fn discard_photo(&self, photo: &PendingPhoto) -> Result<(), StoreError> {
        let path = photo_path(&self.catalog.image_root, &photo.owner_id, &photo.storage_name);
        self.objects.delete(&path).await
    }

    async fn run(&self, query: &Query) -> Result<Vec<Listing>, StoreError> {
        let docs = self.documents.query(&self.catalog.collection, query).await?;
        Ok(to_listings(docs))
    }
}

fn to_listings(docs: Vec<Document>) -> Vec<Listing> {
    docs.into_iter()
        .filter_map(|doc| match Listing::from_document(doc) {
            Ok(listing) => Some(listing),
            Err(e) => {
                tracing::warn!("Skipping listing: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryDocumentStore, MemoryObjectStore};
    use serde_json::json;

    type TestMarketplace = Marketplace<MemoryDocumentStore, MemoryObjectStore>;

    fn marketplace() -> (TestMarketplace, MemoryDocumentStore, MemoryObjectStore) {
        let documents = MemoryDocumentStore::new();
        let objects = MemoryObjectStore::new();
        (
            Marketplace::new(documents.clone(), objects.clone()),
            documents,
            objects,
        )
    }

    fn owner() -> Identity {
        Identity::new("u1", Some("Ana"), Some("ana@x.com"))
    }

    fn form(name: &str) -> ListingForm {
        ListingForm {
            name: name.into(),
            model: "1.0 LT".into(),
            year: "2019".into(),
            km: "32000".into(),
            price: "45000".into(),
            city: "Campinas".into(),
            phone: "11987654321".into(),
            description: "Single owner, full service history".into(),
        }
    }

    async fn photo(market: &TestMarketplace) -> PendingPhoto {
        market
            .upload_photo(&owner(), "image/jpeg", vec![0xff, 0xd8], "blob:preview".into())
            .await
            .unwrap()
    }

    async fn create(market: &TestMarketplace, name: &str) -> String {
        let photos = vec![photo(market).await];
        market.create(&owner(), &form(name), &photos).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_without_photos_does_not_insert() {
        let (market, documents, _) = marketplace();
        let result = market.create(&owner(), &form("Onix"), &[]).await;
        assert_eq!(result, Err(ListingError::NoPhotos));
        assert_eq!(
            ListingError::NoPhotos.to_string(),
            "Send at least one image to save the listing."
        );
        assert!(documents.is_empty("cars"));
    }

    #[tokio::test]
    async fn test_create_with_invalid_phone_does_not_insert() {
        let (market, documents, _) = marketplace();
        let photos = vec![photo(&market).await];
        let bad = ListingForm {
            phone: "12345".into(),
            ..form("Onix")
        };
        match market.create(&owner(), &bad, &photos).await {
            Err(ListingError::Validation(errors)) => assert!(errors.contains("phone")),
            other => panic!("expected a validation error, got {other:?}"),
        }
        assert!(documents.is_empty("cars"));
    }

    #[tokio::test]
    async fn test_created_listing_is_stored_upper_cased_with_timestamp() {
        let (market, _, _) = marketplace();
        let id = create(&market, "onix").await;

        let listing = market.get(&id).await.unwrap().unwrap();
        assert_eq!(listing.name, "ONIX");
        assert_eq!(listing.owner, owner());
        assert_eq!(listing.photos.len(), 1);
        assert!(listing.created.is_some());
    }

    #[tokio::test]
    async fn test_recent_is_newest_first() {
        let (market, _, _) = marketplace();
        for name in ["Gol", "Onix", "Civic"] {
            create(&market, name).await;
        }
        let names: Vec<_> = market
            .recent()
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["CIVIC", "ONIX", "GOL"]);
    }

    #[tokio::test]
    async fn test_search_is_a_name_prefix_range() {
        let (market, _, _) = marketplace();
        for name in ["Golf", "Gol", "Fiesta", "Hb20"] {
            create(&market, name).await;
        }

        let names: Vec<_> = market
            .search("gol")
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["GOL", "GOLF"]);

        let cleared: Vec<_> = market
            .search("  ")
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(cleared, vec!["HB20", "FIESTA", "GOL", "GOLF"]);
    }

    #[tokio::test]
    async fn test_search_ignores_surrounding_whitespace() {
        let (market, _, _) = marketplace();
        for name in ["Gol", "Fiesta"] {
            create(&market, name).await;
        }

        let found = market.search("  gol ").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "GOL");
    }

    #[tokio::test]
    async fn test_owned_by_filters_on_owner_uid() {
        let (market, _, _) = marketplace();
        create(&market, "Onix").await;
        let other = Identity::new("u2", None, None);
        let photos = vec![photo(&market).await];
        market.create(&other, &form("Gol"), &photos).await.unwrap();

        let mine = market.owned_by("u1").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "ONIX");
    }

    #[tokio::test]
    async fn test_delete_survives_photo_failures() {
        let (market, documents, objects) = marketplace();
        let id = create(&market, "Onix").await;
        let listing = market.get(&id).await.unwrap().unwrap();

        objects.set_fail_deletes(true);
        let report = market.delete(&listing).await.unwrap();

        assert!(!report.is_clean());
        assert_eq!(report.failed_photos.len(), 1);
        assert!(market.get(&id).await.unwrap().is_none());
        assert!(documents.is_empty("cars"));
    }

    #[tokio::test]
    async fn test_delete_removes_photos() {
        let (market, _, objects) = marketplace();
        let id = create(&market, "Onix").await;
        let listing = market.get(&id).await.unwrap().unwrap();
        assert_eq!(objects.len(), 1);

        let report = market.delete(&listing).await.unwrap();
        assert!(report.is_clean());
        assert!(objects.is_empty());
    }

    #[tokio::test]
    async fn test_upload_rejects_other_image_types() {
        let (market, _, objects) = marketplace();
        let result = market
            .upload_photo(&owner(), "image/gif", vec![1], String::new())
            .await;
        assert_eq!(
            result,
            Err(ListingError::UnsupportedImage("image/gif".into()))
        );
        assert!(objects.is_empty());
    }

    #[tokio::test]
    async fn test_uploaded_photo_lives_under_owner_folder() {
        let (market, _, objects) = marketplace();
        let pending = photo(&market).await;
        assert_eq!(pending.owner_id, "u1");
        assert!(uuid::Uuid::parse_str(&pending.storage_name).is_ok());
        assert!(objects.contains(&format!("images/u1/{}", pending.storage_name)));

        market.discard_photo(&pending).await.unwrap();
        assert!(objects.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_documents_are_skipped() {
        let (market, documents, _) = marketplace();
        create(&market, "Onix").await;
        documents
            .insert(
                "cars",
                Record::new(json!({ "name": "BROKEN" }).as_object().cloned().unwrap())
                    .with_server_timestamp("created"),
            )
            .await
            .unwrap();

        let listings = market.recent().await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].name, "ONIX");
    }
}
