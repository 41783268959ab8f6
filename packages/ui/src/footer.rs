use dioxus::prelude::*;

#[component]
pub fn Footer() -> Element {
    rsx! {
        footer {
            class: "footer",
            p { "WebCarros. Buy and sell cars near you." }
        }
    }
}
