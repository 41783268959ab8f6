//! # Object store boundary
//!
//! Listing photos live in hosted object storage under
//! `<image_root>/<owner id>/<object name>`. The [`ObjectStore`] trait covers the
//! two calls the marketplace makes: uploading bytes (which yields a public
//! download URL) and deleting an object.

use std::future::Future;

use crate::error::StoreError;

/// Content types accepted for listing photos.
pub const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Async interface to hosted object storage.
pub trait ObjectStore {
    /// Upload `bytes` at `path` and return the remote download URL.
    fn upload(
        &self,
        path: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<String, StoreError>>;
    fn delete(&self, path: &str) -> impl Future<Output = Result<(), StoreError>>;
}

/// Path of an owner's photo: `images/u1/3f2c...`.
pub fn photo_path(image_root: &str, owner_id: &str, name: &str) -> String {
    format!("{image_root}/{owner_id}/{name}")
}

pub fn is_accepted_image(content_type: &str) -> bool {
    ACCEPTED_IMAGE_TYPES.contains(&content_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_path() {
        assert_eq!(photo_path("images", "u1", "abc"), "images/u1/abc");
    }

    #[test]
    fn test_only_jpeg_and_png_are_accepted() {
        assert!(is_accepted_image("image/jpeg"));
        assert!(is_accepted_image("image/png"));
        assert!(!is_accepted_image("image/gif"));
        assert!(!is_accepted_image("application/pdf"));
    }
}
