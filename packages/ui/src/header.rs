use dioxus::prelude::*;

use crate::auth::use_session;
use crate::icons::{FaRightToBracket, FaUser};
use crate::Icon;

const HEADER_CSS: Asset = asset!("/assets/styling/header.css");
const LOGO: Asset = asset!("/assets/logo.svg");

/// Top bar: logo linking home, then a dashboard link for signed-in users or a
/// sign-in link for visitors. Nothing is shown on the right while the session
/// is still initializing.
#[component]
pub fn Header() -> Element {
    let session = use_session();
    let current = session();

    rsx! {
        document::Stylesheet { href: HEADER_CSS }

        header {
            class: "header",
            div {
                class: "header-inner",
                Link {
                    to: "/",
                    img { class: "header-logo", src: LOGO, alt: "WebCarros" }
                }
                if !current.initializing {
                    if current.signed() {
                        Link {
                            to: "/dashboard",
                            class: "header-account",
                            title: "Dashboard",
                            Icon { icon: FaUser, width: 22, height: 22 }
                        }
                    } else {
                        Link {
                            to: "/sign-in",
                            class: "header-account",
                            title: "Sign in",
                            Icon { icon: FaRightToBracket, width: 22, height: 22 }
                        }
                    }
                }
            }
        }
    }
}
