//! # Domain models for identities and vehicle listings
//!
//! These types cross the document-store boundary, so their serde shape is the
//! shape of the stored documents:
//!
//! | Struct | Stored as |
//! |--------|-----------|
//! | [`Identity`] | `{ uid, name, email }` (inside a listing's `owner` field) |
//! | [`ListingPhoto`] | `{ name, url }` |
//! | [`Listing`] | `{ name, model, description, year, price, city, km, phone, owner, photos, created }` |
//!
//! [`PendingPhoto`] never reaches the document store; it lives in the creation
//! form until the listing is submitted or the photo is removed.
//!
//! Numbers written by older clients were sometimes stored as strings (`"2019"`),
//! so the numeric fields deserialise from either representation.

use serde::{Deserialize, Deserializer, Serialize};

use crate::documents::Document;
use crate::error::StoreError;

/// The authenticated user as reported by the identity service.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "uid")]
    pub id: String,
    #[serde(rename = "name", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>, display_name: Option<&str>, email: Option<&str>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.map(str::to_string),
            email: email.map(str::to_string),
        }
    }

    /// Display name, falling back to the email and then the id.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

/// A stored photo of a listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ListingPhoto {
    /// Object name inside the owner's image folder.
    pub name: String,
    /// Public download URL.
    pub url: String,
}

/// A vehicle advertisement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Document id; not part of the stored fields.
    #[serde(default, skip_serializing)]
    pub id: String,
    pub name: String,
    pub model: String,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub year: u32,
    #[serde(deserialize_with = "lenient_f64")]
    pub price: f64,
    pub city: String,
    #[serde(rename = "km", deserialize_with = "lenient_u64")]
    pub odometer_km: u64,
    #[serde(deserialize_with = "lenient_string")]
    pub phone: String,
    pub owner: Identity,
    #[serde(default)]
    pub photos: Vec<ListingPhoto>,
    /// Server-assigned creation timestamp, read-only.
    #[serde(default, skip_serializing)]
    pub created: Option<String>,
}

impl Listing {
    /// Map a stored document into a listing.
    pub fn from_document(doc: Document) -> Result<Self, StoreError> {
        let mut listing: Listing = serde_json::from_value(serde_json::Value::Object(doc.fields))
            .map_err(|e| StoreError::Malformed(format!("listing {}: {e}", doc.id)))?;
        listing.id = doc.id;
        Ok(listing)
    }

    /// The photo shown on listing cards.
    pub fn cover(&self) -> Option<&ListingPhoto> {
        self.photos.first()
    }
}

/// A photo uploaded from the creation form but not yet attached to a listing.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingPhoto {
    /// Id of the identity that uploaded the photo (the folder it lives in).
    pub owner_id: String,
    /// Object name inside the owner's folder (a v4 UUID).
    pub storage_name: String,
    /// URL usable for a local preview before the remote copy loads.
    pub preview_url: String,
    /// Download URL returned by the object store.
    pub remote_url: String,
}

impl PendingPhoto {
    pub fn to_listing_photo(&self) -> ListingPhoto {
        ListingPhoto {
            name: self.storage_name.clone(),
            url: self.remote_url.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(serde_json::Number),
    Text(String),
}

impl NumberOrText {
    fn into_text(self) -> String {
        match self {
            NumberOrText::Number(n) => n.to_string(),
            NumberOrText::Text(s) => s.trim().to_string(),
        }
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let text = NumberOrText::deserialize(d)?.into_text();
    text.parse().map_err(serde::de::Error::custom)
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let value = lenient_f64(d)?;
    if value < 0.0 {
        return Err(serde::de::Error::custom("negative value"));
    }
    Ok(value as u64)
}

fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let value = lenient_u64(d)?;
    u32::try_from(value).map_err(serde::de::Error::custom)
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(NumberOrText::deserialize(d)?.into_text())
}
