//! Layout guarding the signed-in area.

use std::time::Duration;

use dioxus::prelude::*;
use store::{GuardDecision, RouteGuard};
use ui::platform::sleep;
use ui::{notify, use_backend, use_notifications, use_session, NoticeLevel};

use crate::Route;

/// Renders nothing until the first identity event, redirects visitors to the
/// sign-in page, and gives up waiting after the configured timeout.
#[component]
pub fn PrivateRoute() -> Element {
    let session = use_session();
    let backend = use_backend();
    let nav = use_navigator();
    let mut notifications = use_notifications();
    let guard = RouteGuard::from_secs(backend.guard_timeout_secs());
    let mut waited = use_signal(|| Duration::ZERO);

    use_future(move || async move {
        let Some(timeout) = guard.timeout() else {
            return;
        };
        sleep(timeout).await;
        if session.peek().initializing {
            notify(
                &mut notifications,
                NoticeLevel::Error,
                "The authentication service is not responding, sign in again.",
            );
        }
        waited.set(timeout);
    });

    match guard.decide(&session(), waited()) {
        GuardDecision::Allow => rsx! {
            Outlet::<Route> {}
        },
        GuardDecision::Pending => rsx! {
            div {}
        },
        GuardDecision::Redirect | GuardDecision::TimedOut => {
            nav.replace(Route::SignIn {});
            rsx! {}
        }
    }
}
