use dioxus::prelude::*;

const FORM_CSS: Asset = asset!("/assets/styling/form.css");

/// A labelled input with its validation message underneath.
#[component]
pub fn FormField(
    name: String,
    value: String,
    oninput: EventHandler<String>,
    label: Option<String>,
    error: Option<String>,
    #[props(default = "text".to_string())] kind: String,
    #[props(default)] placeholder: String,
) -> Element {
    rsx! {
        document::Stylesheet { href: FORM_CSS }

        div {
            class: "form-field",
            if let Some(text) = label {
                label { r#for: "{name}", "{text}" }
            }
            input {
                id: "{name}",
                name: "{name}",
                class: if error.is_some() { "input input--invalid" } else { "input" },
                r#type: "{kind}",
                placeholder: "{placeholder}",
                value: "{value}",
                oninput: move |evt: FormEvent| oninput.call(evt.value()),
            }
            if let Some(ref message) = error {
                p { class: "form-error", "{message}" }
            }
        }
    }
}

/// Multi-line variant of [`FormField`].
#[component]
pub fn FormArea(
    name: String,
    value: String,
    oninput: EventHandler<String>,
    label: Option<String>,
    error: Option<String>,
    #[props(default)] placeholder: String,
) -> Element {
    rsx! {
        document::Stylesheet { href: FORM_CSS }

        div {
            class: "form-field",
            if let Some(text) = label {
                label { r#for: "{name}", "{text}" }
            }
            textarea {
                id: "{name}",
                name: "{name}",
                class: if error.is_some() { "input textarea input--invalid" } else { "input textarea" },
                placeholder: "{placeholder}",
                value: "{value}",
                oninput: move |evt: FormEvent| oninput.call(evt.value()),
            }
            if let Some(ref message) = error {
                p { class: "form-error", "{message}" }
            }
        }
    }
}
