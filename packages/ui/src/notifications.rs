//! Transient notifications shown in a corner of the screen.

use std::time::Duration;

use dioxus::core::spawn_forever;
use dioxus::prelude::*;

use crate::platform::sleep;

const NOTIFICATIONS_CSS: Asset = asset!("/assets/styling/notifications.css");

/// How long a notification stays on screen.
const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Clone, Debug, Default)]
pub struct Notifications {
    entries: Vec<Notice>,
    next_id: u64,
}

impl Notifications {
    pub fn push(&mut self, level: NoticeLevel, message: &str) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(Notice {
            id,
            level,
            message: message.to_string(),
        });
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.entries.retain(|n| n.id != id);
    }

    pub fn entries(&self) -> &[Notice] {
        &self.entries
    }
}

pub fn use_notifications() -> Signal<Notifications> {
    use_context::<Signal<Notifications>>()
}

/// Show a notification and schedule its removal.
pub fn notify(notifications: &mut Signal<Notifications>, level: NoticeLevel, message: &str) {
    if level == NoticeLevel::Error {
        tracing::warn!("{}", message);
    }
    let id = notifications.write().push(level, message);
    let mut notifications = *notifications;
    // Outlive the calling page, which may navigate away before the timer fires
    spawn_forever(async move {
        sleep(NOTIFICATION_TTL).await;
        notifications.write().dismiss(id);
    });
}

/// Provides the notification signal and renders the notification stack above
/// `children`.
#[component]
pub fn NotificationProvider(children: Element) -> Element {
    use_context_provider(|| Signal::new(Notifications::default()));

    rsx! {
        {children}
        NotificationCenter {}
    }
}

#[component]
fn NotificationCenter() -> Element {
    let mut notifications = use_notifications();
    let entries = notifications().entries().to_vec();

    rsx! {
        document::Stylesheet { href: NOTIFICATIONS_CSS }

        div {
            class: "notifications",
            for notice in entries {
                div {
                    key: "{notice.id}",
                    class: match notice.level {
                        NoticeLevel::Error => "notice error",
                        NoticeLevel::Success => "notice success",
                        NoticeLevel::Info => "notice info",
                    },
                    role: "status",
                    onclick: move |_| notifications.write().dismiss(notice.id),
                    "{notice.message}"
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_dismiss() {
        let mut notifications = Notifications::default();
        let first = notifications.push(NoticeLevel::Success, "User signed out");
        let second = notifications.push(NoticeLevel::Error, "Incorrect email or password.");
        assert_ne!(first, second);

        notifications.dismiss(first);
        assert_eq!(notifications.entries().len(), 1);
        assert_eq!(notifications.entries()[0].message, "Incorrect email or password.");
    }
}
