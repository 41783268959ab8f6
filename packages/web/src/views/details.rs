use dioxus::prelude::*;
use store::format::{format_brl, format_km, whatsapp_link};
use ui::icons::FaWhatsapp;
use ui::{use_backend, Footer, Icon, PhotoCarousel};

use crate::Route;

#[component]
pub fn Details(id: String) -> Element {
    // Track the id in a signal so the resource re-runs when the route param changes
    let mut id_signal = use_signal(|| id.clone());
    if *id_signal.peek() != id {
        id_signal.set(id.clone());
    }

    let backend = use_backend();
    let nav = use_navigator();

    let listing = use_resource(move || {
        let market = backend.marketplace();
        let id = id_signal();
        async move {
            match market.get(&id).await {
                Ok(found) => found,
                Err(e) => {
                    tracing::error!("Failed to load listing {}: {}", id, e);
                    None
                }
            }
        }
    });

    let listing = match &*listing.read() {
        None => return rsx! {},
        Some(None) => {
            nav.replace(Route::Home {});
            return rsx! {};
        }
        Some(Some(listing)) => listing.clone(),
    };

    let price = format_brl(listing.price);
    let km = format_km(listing.odometer_km);
    let contact = whatsapp_link(&listing);

    rsx! {
        PhotoCarousel { photos: listing.photos.clone() }

        main {
            class: "details",
            div {
                class: "details-heading",
                h1 { "{listing.name}" }
                h1 { "{price}" }
            }
            p { class: "details-model", "{listing.model}" }

            div {
                class: "details-facts",
                div {
                    p { "City" }
                    strong { "{listing.city}" }
                }
                div {
                    p { "Year" }
                    strong { "{listing.year}" }
                }
                div {
                    p { "KM" }
                    strong { "{km}" }
                }
            }

            strong { "Description:" }
            p { class: "details-description", "{listing.description}" }

            strong { "Phone / WhatsApp:" }
            p { "{listing.phone}" }

            a {
                class: "whatsapp-link",
                href: "{contact}",
                target: "_blank",
                rel: "noopener noreferrer",
                "Talk to the seller "
                Icon { icon: FaWhatsapp, width: 22, height: 22, fill: "#fff" }
            }
        }

        Footer {}
    }
}
