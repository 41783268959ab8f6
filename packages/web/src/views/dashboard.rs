use dioxus::prelude::*;
use store::{Listing, ListingFeed};
use ui::{notify, use_backend, use_notifications, use_session, DashboardNav, ListingCard, NoticeLevel};

/// Listings owned by the signed-in user, each with a delete button.
#[component]
pub fn Dashboard() -> Element {
    let backend = use_backend();
    let session = use_session();
    let mut feed = use_signal(ListingFeed::new);
    let mut notifications = use_notifications();

    let owner_id = session
        .read()
        .identity
        .as_ref()
        .map(|identity| identity.id.clone());

    // Reload when a different user signs in
    let mut owner_signal = use_signal(|| owner_id.clone());
    if *owner_signal.peek() != owner_id {
        owner_signal.set(owner_id.clone());
    }

    let loader = backend.clone();
    use_effect(move || {
        let Some(owner_id) = owner_signal() else {
            return;
        };
        let market = loader.marketplace();
        let ticket = feed.write().begin();
        spawn(async move {
            match market.owned_by(&owner_id).await {
                Ok(listings) => {
                    feed.write().apply(ticket, listings);
                }
                Err(e) => {
                    tracing::error!("Failed to load listings of {}: {}", owner_id, e);
                    if feed.write().fail(ticket) {
                        notify(&mut notifications, NoticeLevel::Error, "Could not load your cars.");
                    }
                }
            }
        });
    });

    let delete = use_callback(move |listing: Listing| {
        let market = backend.marketplace();
        spawn(async move {
            match market.delete(&listing).await {
                Ok(report) => {
                    feed.write().remove(&listing.id);
                    notify(&mut notifications, NoticeLevel::Success, "Car deleted successfully");
                    if !report.is_clean() {
                        notify(
                            &mut notifications,
                            NoticeLevel::Error,
                            "Some photos of the car could not be removed.",
                        );
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to delete listing {}: {}", listing.id, e);
                    notify(&mut notifications, NoticeLevel::Error, "Could not delete the car, try again.");
                }
            }
        });
    });

    let listings = feed.read().listings().to_vec();

    rsx! {
        DashboardNav {}

        main {
            class: "listing-grid",
            for listing in listings {
                ListingCard {
                    key: "{listing.id}",
                    listing: listing.clone(),
                    on_delete: move |listing: Listing| delete.call(listing),
                }
            }
        }
    }
}
