use api::Backend;
use dioxus::prelude::*;

/// The backend provided at the root of the app.
pub fn use_backend() -> Backend {
    use_context::<Backend>()
}

/// Make `backend` available to every descendant. Call once, from the root
/// component.
pub fn provide_backend(backend: impl FnOnce() -> Backend) -> Backend {
    use_context_provider(backend)
}
