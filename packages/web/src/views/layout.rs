use dioxus::prelude::*;
use ui::Header;

use crate::Route;

#[component]
pub fn Layout() -> Element {
    rsx! {
        Header {}
        div {
            class: "container",
            Outlet::<Route> {}
        }
    }
}
