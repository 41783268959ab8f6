use dioxus::prelude::*;
use store::IdentityService;

use crate::backend::use_backend;
use crate::icons::FaRightFromBracket;
use crate::notifications::{notify, use_notifications, NoticeLevel};
use crate::Icon;

/// Links of the signed-in area plus the sign-out button.
#[component]
pub fn DashboardNav() -> Element {
    let backend = use_backend();
    let mut notifications = use_notifications();

    let sign_out = move |_| {
        let backend = backend.clone();
        async move {
            if let Err(e) = backend.sign_out().await {
                tracing::error!("Sign out failed: {}", e);
                notify(&mut notifications, NoticeLevel::Error, "Could not sign out, try again.");
            }
        }
    };

    rsx! {
        nav {
            class: "dashboard-nav",
            div {
                class: "dashboard-nav-links",
                Link { to: "/dashboard", "Dashboard" }
                Link { to: "/dashboard/new", "New car" }
            }
            button {
                class: "dashboard-nav-signout",
                onclick: sign_out,
                Icon { icon: FaRightFromBracket, width: 14, height: 14 }
                " Sign out"
            }
        }
    }
}
