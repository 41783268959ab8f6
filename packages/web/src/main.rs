use api::Backend;
use dioxus::prelude::*;

use ui::{provide_backend, AuthProvider, NotificationProvider};
use views::{Dashboard, Details, Home, Layout, NewListing, PrivateRoute, SignIn, SignUp};

mod views;

#[derive(Debug, Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum Route {
    #[layout(Layout)]
        #[route("/")]
        Home {},
        #[route("/details/:id")]
        Details { id: String },
        #[layout(PrivateRoute)]
            #[route("/dashboard")]
            Dashboard {},
            #[route("/dashboard/new")]
            NewListing {},
        #[end_layout]
    #[end_layout]
    #[route("/sign-in")]
    SignIn {},
    #[route("/sign-up")]
    SignUp {},
    #[route("/:..segments")]
    NotFound { segments: Vec<String> },
}

const MAIN_CSS: Asset = asset!("/assets/main.css");

fn main() {
    dioxus::launch(App);
}

/// Build the backend described by the embedded `webcarros.toml`.
fn load_backend() -> Backend {
    match Backend::from_toml(include_str!("../webcarros.toml")) {
        Ok(backend) => backend,
        Err(e) => {
            tracing::error!("{}, falling back to the demo backend", e);
            Backend::demo()
        }
    }
}

#[component]
fn App() -> Element {
    provide_backend(load_backend);

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }
        NotificationProvider {
            AuthProvider {
                Router::<Route> {}
            }
        }
    }
}

#[component]
fn NotFound(segments: Vec<String>) -> Element {
    let nav = use_navigator();
    tracing::debug!("No route for /{}", segments.join("/"));
    nav.replace(Route::Home {});
    rsx! {}
}
