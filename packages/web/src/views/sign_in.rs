use dioxus::prelude::*;
use store::validation::check;
use store::{FieldErrors, IdentityService, SignInForm};
use ui::{notify, use_backend, use_notifications, use_session, FormField, NoticeLevel};

use super::LOGO;
use crate::Route;

/// Sign-in page. Entering it signs out whoever is signed in.
#[component]
pub fn SignIn() -> Element {
    let backend = use_backend();
    let session = use_session();
    let nav = use_navigator();
    let mut notifications = use_notifications();

    let mut form = use_signal(SignInForm::default);
    let mut errors = use_signal(FieldErrors::default);
    let mut submitting = use_signal(|| false);

    let entry_backend = backend.clone();
    use_hook(move || {
        let was_signed = session.peek().signed();
        spawn(async move {
            match entry_backend.sign_out().await {
                Ok(()) if was_signed => {
                    notify(&mut notifications, NoticeLevel::Success, "User signed out");
                }
                Ok(()) => {}
                Err(e) => tracing::error!("Sign out on entry failed: {}", e),
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
            let result = backend.sign_in(current.email.trim(), &current.password).await;
            submitting.set(false);
            match result {
                Ok(identity) => {
                    tracing::info!("Signed in as {}", identity.id);
                    nav.replace(Route::Dashboard {});
                }
                Err(e) => {
                    tracing::error!("Sign in failed: {}", e);
                    notify(&mut notifications, NoticeLevel::Error, "Incorrect email or password.");
                }
            }
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
                    "Sign in"
                }
            }

            Link { to: Route::SignUp {}, "Don't have an account yet? Sign up" }
        }
    }
}
