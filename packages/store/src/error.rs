//! Error types shared by the collaborators and the listing service.

use thiserror::Error;

use crate::validation::FieldErrors;

/// Failures reported by an [`crate::IdentityService`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IdentityError {
    #[error("incorrect email or password")]
    InvalidCredentials,
    #[error("an account with this email already exists")]
    AccountExists,
    #[error("password is too weak")]
    WeakPassword,
    #[error("identity service rejected the request: {0}")]
    Rejected(String),
    #[error("identity service unreachable: {0}")]
    Transport(String),
}

/// Failures reported by a [`crate::DocumentStore`] or [`crate::ObjectStore`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("backend error: {0}")]
    Backend(String),
    #[error("backend unreachable: {0}")]
    Transport(String),
    #[error("malformed data: {0}")]
    Malformed(String),
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Malformed(e.to_string())
    }
}

/// Failures of the listing workflows in [`crate::Marketplace`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ListingError {
    #[error("the form has invalid fields")]
    Validation(FieldErrors),
    #[error("Send at least one image to save the listing.")]
    NoPhotos,
    #[error("unsupported image type {0}, send a JPEG or PNG image")]
    UnsupportedImage(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
