use dioxus::prelude::*;
use store::validation::check;
use store::{FieldErrors, IdentityService, SignUpForm};
use ui::{notify, use_backend, use_notifications, use_session, FormField, NoticeLevel};

use super::LOGO;
use crate::Route;

#[component]
pub fn SignUp() -> Element {
    let backend = use_backend();
    let mut session = use_session();
    let nav = use_navigator();
    let mut notifications = use_notifications();

    let mut form = use_signal(SignUpForm::default);
    let mut errors = use_signal(FieldErrors::default);
    let mut submitting = use_signal(|| false);

    let entry_backend = backend.clone();
    use_hook(move || {
        spawn(async move {
            if let Err(e) = entry_backend.sign_out().await {
                tracing::error!("Sign out on entry failed: {}", e);
            }
        });
    });

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let backend = backend.clone();
        async move {
            let current = form.peek().clone();
            if let Err(found) = check(&current) {
                errors.set(found);
                return;
            }
            errors.set(FieldErrors::default());
            submitting.set(true);

            let created = match backend.sign_up(current.email.trim(), &current.password).await {
                Ok(identity) => identity,
                Err(e) => {
                    tracing::error!("Sign up failed: {}", e);
                    notify(
                        &mut notifications,
                        NoticeLevel::Error,
                        "Could not register the user, try again.",
                    );
                    submitting.set(false);
                    return;
                }
            };

            let name = current.name.trim();
            let identity = match backend.update_display_name(&created, name).await {
                Ok(named) => named,
                Err(e) => {
                    tracing::warn!("Failed to set display name of {}: {}", created.id, e);
                    created
                }
            };
            tracing::info!("Registered {}", identity.id);
            session.write().set_identity(identity);
            submitting.set(false);
            nav.replace(Route::Dashboard {});
        }
    };

    let error = move |field: &str| errors.read().get(field).map(str::to_string);
    let values = form();

    rsx! {
        div {
            class: "auth-page",
            Link {
                to: Route::Home {},
                class: "auth-logo",
                img { src: LOGO, alt: "WebCarros" }
            }

            form {
                class: "auth-form",
                onsubmit: handle_submit,
                FormField {
                    name: "name",
                    placeholder: "Type your full name...",
                    value: values.name.clone(),
                    error: error("name"),
                    oninput: move |v: String| form.write().name = v,
                }
                FormField {
                    name: "email",
                    kind: "email",
                    placeholder: "Type your email...",
                    value: values.email.clone(),
                    error: error("email"),
                    oninput: move |v: String| form.write().email = v,
                }
                FormField {
                    name: "password",
                    kind: "password",
                    placeholder: "Type your password...",
                    value: values.password.clone(),
                    error: error("password"),
                    oninput: move |v: String| form.write().password = v,
                }
                button {
                    class: "form-submit",
                    r#type: "submit",
                    disabled: submitting(),
                    "Sign up"
                }
            }

            Link { to: Route::SignIn {}, "Already have an account? Sign in" }
        }
    }
}
