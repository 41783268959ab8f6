//! Form for advertising a new car: photo uploads plus the listing fields.

use dioxus::prelude::*;
use store::{FieldErrors, ListingError, ListingForm, PendingPhoto};
use ui::icons::{FaTrash, FaUpload};
use ui::platform::preview_url;
use ui::{
    notify, use_backend, use_notifications, use_session, DashboardNav, Footer, FormArea,
    FormField, Icon, NoticeLevel,
};

/// Content type of a picked file, falling back to its extension.
fn picked_content_type(declared: Option<String>, name: &str) -> String {
    if let Some(declared) = declared.filter(|ct| !ct.is_empty()) {
        return declared;
    }
    let lower = name.to_lowercase();
    if lower.ends_with(".png") {
        "image/png".to_string()
    } else if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg".to_string()
    } else {
        "application/octet-stream".to_string()
    }
}

#[component]
pub fn NewListing() -> Element {
    let backend = use_backend();
    let session = use_session();
    let mut notifications = use_notifications();

    let mut form = use_signal(ListingForm::default);
    let mut errors = use_signal(FieldErrors::default);
    let mut photos = use_signal(Vec::<PendingPhoto>::new);
    let mut saving = use_signal(|| false);

    let upload_backend = backend.clone();
    let handle_files = move |evt: FormEvent| {
        let backend = upload_backend.clone();
        async move {
            let Some(owner) = session.peek().identity.clone() else {
                return;
            };
            let market = backend.marketplace();
            for file in evt.files() {
                let name = file.name();
                let bytes = match file.read_bytes().await {
                    Ok(bytes) => bytes.to_vec(),
                    Err(e) => {
                        tracing::error!("Failed to read {}: {}", name, e);
                        notify(&mut notifications, NoticeLevel::Error, "Could not read the image.");
                        continue;
                    }
                };
                let content_type = picked_content_type(file.content_type(), &name);
                let preview = preview_url(&content_type, &bytes);
                match market.upload_photo(&owner, &content_type, bytes, preview).await {
                    Ok(photo) => photos.write().push(photo),
                    Err(ListingError::UnsupportedImage(ct)) => {
                        tracing::warn!("Rejected {} with type {}", name, ct);
                        notify(&mut notifications, NoticeLevel::Error, "Send a JPEG or PNG image");
                    }
                    Err(e) => {
                        tracing::error!("Failed to upload {}: {}", name, e);
                        notify(&mut notifications, NoticeLevel::Error, "Could not upload the image, try again.");
                    }
                }
            }
        }
    };

    let discard_backend = backend.clone();
    let discard = use_callback(move |photo: PendingPhoto| {
        let market = discard_backend.marketplace();
        spawn(async move {
            match market.discard_photo(&photo).await {
                Ok(()) => photos.write().retain(|p| p.storage_name != photo.storage_name),
                Err(e) => {
                    tracing::error!("Failed to delete photo {}: {}", photo.storage_name, e);
                    notify(&mut notifications, NoticeLevel::Error, "Could not remove the image, try again.");
                }
            }
        });
    });

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        let backend = backend.clone();
        async move {
            if saving() {
                return;
            }
            let Some(owner) = session.peek().identity.clone() else {
                return;
            };
            saving.set(true);
            let current = form.peek().clone();
            let attached = photos.peek().clone();
            match backend.marketplace().create(&owner, &current, &attached).await {
                Ok(_) => {
                    errors.set(FieldErrors::default());
                    form.set(ListingForm::default());
                    photos.write().clear();
                    notify(&mut notifications, NoticeLevel::Success, "Car registered successfully");
                }
                Err(ListingError::Validation(found)) => errors.set(found),
                Err(ListingError::NoPhotos) => {
                    errors.set(FieldErrors::default());
                    notify(&mut notifications, NoticeLevel::Error, &ListingError::NoPhotos.to_string());
                }
                Err(e) => {
                    tracing::error!("Failed to create listing: {}", e);
                    notify(&mut notifications, NoticeLevel::Error, "Error registering the vehicle.");
                }
            }
            saving.set(false);
        }
    };

    let error = move |field: &str| errors.read().get(field).map(str::to_string);
    let values = form();
    let pending = photos();

    rsx! {
        DashboardNav {}

        section {
            class: "upload-strip",
            label {
                class: "upload-tile",
                Icon { icon: FaUpload, width: 30, height: 30 }
                input {
                    r#type: "file",
                    accept: "image/*",
                    multiple: true,
                    onchange: handle_files,
                }
            }
            for photo in pending {
                div {
                    key: "{photo.storage_name}",
                    class: "upload-preview",
                    button {
                        class: "upload-preview-remove",
                        title: "Remove image",
                        onclick: {
                            let photo = photo.clone();
                            move |_| discard.call(photo.clone())
                        },
                        Icon { icon: FaTrash, width: 20, height: 20, fill: "#fff" }
                    }
                    img { src: "{photo.preview_url}", alt: "Car photo" }
                }
            }
        }

        form {
            class: "listing-form",
            onsubmit: handle_submit,

            FormField {
                name: "name",
                label: "Name",
                placeholder: "Ex: Onix 1.0...",
                value: values.name.clone(),
                error: error("name"),
                oninput: move |v: String| form.write().name = v,
            }
            FormField {
                name: "model",
                label: "Model",
                placeholder: "Ex: 1.0 Flex PLUS MANUAL...",
                value: values.model.clone(),
                error: error("model"),
                oninput: move |v: String| form.write().model = v,
            }
            div {
                class: "form-row",
                FormField {
                    name: "year",
                    label: "Year",
                    placeholder: "Ex: 2016",
                    value: values.year.clone(),
                    error: error("year"),
                    oninput: move |v: String| form.write().year = v,
                }
                FormField {
                    name: "km",
                    label: "KM",
                    placeholder: "Ex: 23900",
                    value: values.km.clone(),
                    error: error("km"),
                    oninput: move |v: String| form.write().km = v,
                }
            }
            div {
                class: "form-row",
                FormField {
                    name: "phone",
                    label: "Phone / WhatsApp",
                    placeholder: "Ex: 011999101923...",
                    value: values.phone.clone(),
                    error: error("phone"),
                    oninput: move |v: String| form.write().phone = v,
                }
                FormField {
                    name: "city",
                    label: "City",
                    placeholder: "Ex: Campo Grande - MS...",
                    value: values.city.clone(),
                    error: error("city"),
                    oninput: move |v: String| form.write().city = v,
                }
            }
            FormField {
                name: "price",
                label: "Price",
                placeholder: "Ex: 69000",
                value: values.price.clone(),
                error: error("price"),
                oninput: move |v: String| form.write().price = v,
            }
            FormArea {
                name: "description",
                label: "Description",
                placeholder: "Enter the full description of the car...",
                value: values.description.clone(),
                error: error("description"),
                oninput: move |v: String| form.write().description = v,
            }

            button {
                class: "form-submit",
                r#type: "submit",
                disabled: saving(),
                "Register"
            }
        }

        Footer {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_content_type_wins() {
        assert_eq!(
            picked_content_type(Some("image/png".into()), "car.jpg"),
            "image/png"
        );
    }

    #[test]
    fn test_falls_back_to_extension() {
        assert_eq!(picked_content_type(None, "CAR.JPEG"), "image/jpeg");
        assert_eq!(picked_content_type(Some(String::new()), "car.png"), "image/png");
        assert_eq!(
            picked_content_type(None, "notes.txt"),
            "application/octet-stream"
        );
    }
}
