//! This crate contains all shared UI for the workspace.

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_brands_icons::FaWhatsapp;
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

pub mod platform;

mod backend;
pub use backend::{provide_backend, use_backend};

mod auth;
pub use auth::{use_session, AuthProvider};

pub mod notifications;
pub use notifications::{notify, use_notifications, NoticeLevel, NotificationProvider};

mod header;
pub use header::Header;

mod navigation_bar;
pub use navigation_bar::DashboardNav;

mod footer;
pub use footer::Footer;

mod form_field;
pub use form_field::{FormArea, FormField};

mod listing_card;
pub use listing_card::ListingCard;

mod photo_carousel;
pub use photo_carousel::{slides_per_view, PhotoCarousel};
