use dioxus::prelude::*;
use store::format::{format_brl, format_km};
use store::Listing;

use crate::icons::FaTrash;
use crate::Icon;

const LISTING_CARD_CSS: Asset = asset!("/assets/styling/listing_card.css");

/// Grid card of a listing: cover photo, name, year and mileage, price, city.
/// Shows a delete button when `on_delete` is set.
#[component]
pub fn ListingCard(listing: Listing, on_delete: Option<EventHandler<Listing>>) -> Element {
    let mut cover_loaded = use_signal(|| false);
    let details = format!("/details/{}", listing.id);
    let cover = listing.cover().map(|p| p.url.clone());
    let price = format_brl(listing.price);
    let km = format_km(listing.odometer_km);

    rsx! {
        document::Stylesheet { href: LISTING_CARD_CSS }

        section {
            class: "listing-card",
            if let Some(handler) = on_delete {
                button {
                    class: "listing-card-delete",
                    title: "Delete listing",
                    onclick: {
                        let listing = listing.clone();
                        move |_| handler.call(listing.clone())
                    },
                    Icon { icon: FaTrash, width: 16, height: 16 }
                }
            }
            Link {
                to: details,
                div {
                    class: "listing-card-cover",
                    if !cover_loaded() {
                        div { class: "listing-card-placeholder" }
                    }
                    if let Some(url) = cover {
                        img {
                            class: if cover_loaded() { "listing-card-image" } else { "listing-card-image hidden" },
                            src: "{url}",
                            alt: "{listing.name}",
                            onload: move |_| cover_loaded.set(true),
                        }
                    }
                }
                p { class: "listing-card-name", "{listing.name}" }
                div {
                    class: "listing-card-body",
                    span { class: "listing-card-meta", "{listing.year} | {km} Km" }
                    strong { class: "listing-card-price", "{price}" }
                }
                div { class: "listing-card-divider" }
                div {
                    class: "listing-card-city",
                    span { "{listing.city}" }
                }
            }
        }
    }
}
