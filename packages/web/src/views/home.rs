use api::Backend;
use dioxus::prelude::*;
use store::{ListingFeed, Marketplace};
use ui::notifications::Notifications;
use ui::{notify, use_backend, use_notifications, ListingCard, NoticeLevel};

/// Run a search (empty = recent listings) and apply it to `feed` unless a
/// newer search has started meanwhile.
fn load_listings(
    market: Marketplace<Backend, Backend>,
    query: String,
    mut feed: Signal<ListingFeed>,
    mut notifications: Signal<Notifications>,
) {
    let ticket = feed.write().begin();
    spawn(async move {
        match market.search(&query).await {
            Ok(listings) => {
                feed.write().apply(ticket, listings);
            }
            Err(e) => {
                tracing::error!("Failed to load listings: {}", e);
                if feed.write().fail(ticket) {
                    notify(&mut notifications, NoticeLevel::Error, "Could not load the listings.");
                }
            }
        }
    });
}

#[component]
pub fn Home() -> Element {
    let backend = use_backend();
    let feed = use_signal(ListingFeed::new);
    let notifications = use_notifications();
    let mut search = use_signal(String::new);

    use_hook(|| load_listings(backend.marketplace(), String::new(), feed, notifications));

    let handle_search = move |evt: FormEvent| {
        evt.prevent_default();
        load_listings(backend.marketplace(), search(), feed, notifications);
    };

    let listings = feed.read().listings().to_vec();
    let nothing_found = !feed.read().is_loading() && feed.read().is_empty();

    rsx! {
        form {
            class: "search",
            onsubmit: handle_search,
            input {
                r#type: "text",
                placeholder: "Type the car name",
                value: search(),
                oninput: move |evt: FormEvent| search.set(evt.value()),
            }
            button { r#type: "submit", "Search" }
        }

        h1 { class: "page-title", "New and used cars all over Brazil" }

        if nothing_found {
            p { class: "empty-feed", "No cars found." }
        }

        main {
            class: "listing-grid",
            for listing in listings {
                ListingCard { key: "{listing.id}", listing: listing.clone() }
            }
        }
    }
}
