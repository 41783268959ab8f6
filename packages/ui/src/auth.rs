//! Session context for the UI.
//!
//! [`AuthProvider`] attaches a [`SessionHolder`] to the backend's identity
//! service when it mounts, restores the persisted sign-in, and mirrors every
//! settled session into a `Signal<Session>` context. Unmounting drops the
//! holder, which releases the subscription.

use dioxus::prelude::*;
use store::{IdentityService, Session, SessionHolder};

use crate::backend::use_backend;

/// The current session. Re-renders readers when someone signs in or out.
pub fn use_session() -> Signal<Session> {
    use_context::<Signal<Session>>()
}

#[component]
pub fn AuthProvider(children: Element) -> Element {
    let backend = use_backend();
    let mut session = use_signal(Session::default);

    use_future(move || {
        let backend = backend.clone();
        async move {
            let mut holder = SessionHolder::attach(&backend);
            backend.restore().await;
            while let Some(current) = holder.next().await {
                session.set(current.clone());
            }
            tracing::warn!("Identity service closed the subscription");
        }
    });

    use_context_provider(|| session);

    rsx! {
        {children}
    }
}
