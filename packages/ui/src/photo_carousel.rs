use dioxus::prelude::*;
use store::ListingPhoto;

use crate::platform::viewport_width;

const CAROUSEL_CSS: Asset = asset!("/assets/styling/carousel.css");

/// Below this viewport width the carousel shows one photo at a time.
const NARROW_VIEWPORT: f64 = 720.0;

pub fn slides_per_view(width: f64) -> usize {
    if width < NARROW_VIEWPORT {
        1
    } else {
        2
    }
}

/// Paged photo strip with previous/next controls and page dots.
#[component]
pub fn PhotoCarousel(photos: Vec<ListingPhoto>) -> Element {
    let mut per_view = use_signal(|| viewport_width().map_or(2, slides_per_view));
    let mut start = use_signal(|| 0usize);

    let count = photos.len();
    let shown = per_view().min(count.max(1));
    let last_start = count.saturating_sub(shown);
    let first = start().min(last_start);
    let visible: Vec<ListingPhoto> = photos.iter().skip(first).take(shown).cloned().collect();
    let pages = last_start + 1;

    rsx! {
        document::Stylesheet { href: CAROUSEL_CSS }

        div {
            class: "carousel",
            onresize: move |evt: Event<ResizeData>| {
                let width = viewport_width()
                    .or_else(|| evt.get_content_box_size().ok().map(|size| size.width));
                if let Some(width) = width {
                    per_view.set(slides_per_view(width));
                }
            },
            if first > 0 {
                button {
                    class: "carousel-control prev",
                    title: "Previous photo",
                    onclick: move |_| start.set(first - 1),
                    "‹"
                }
            }
            div {
                class: "carousel-track",
                for photo in visible {
                    div {
                        key: "{photo.name}",
                        class: if shown == 1 { "carousel-slide single" } else { "carousel-slide" },
                        img { src: "{photo.url}", alt: "Car photo" }
                    }
                }
            }
            if first < last_start {
                button {
                    class: "carousel-control next",
                    title: "Next photo",
                    onclick: move |_| start.set(first + 1),
                    "›"
                }
            }
            if pages > 1 {
                div {
                    class: "carousel-dots",
                    for page in 0..pages {
                        span {
                            key: "{page}",
                            class: if page == first { "carousel-dot active" } else { "carousel-dot" },
                            onclick: move |_| start.set(page),
                        }
                    }
                }
            }
        }
    }
}
