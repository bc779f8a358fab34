use std::time::Duration;

use dioxus::prelude::*;

use crate::vm::{NotificationCenter, ToastKind};

/// How long a toast stays up before it dismisses itself.
const TOAST_TTL: Duration = Duration::from_secs(4);

/// Provide the notification context for everything below the calling component.
pub fn use_notification_provider() -> Signal<NotificationCenter> {
    use_context_provider(|| Signal::new(NotificationCenter::default()))
}

#[must_use]
pub fn use_notifications() -> Signal<NotificationCenter> {
    use_context::<Signal<NotificationCenter>>()
}

/// Show a toast and schedule its dismissal.
pub fn notify(mut center: Signal<NotificationCenter>, kind: ToastKind, message: impl Into<String>) {
    let id = center.write().push(kind, message);
    spawn(async move {
        tokio::time::sleep(TOAST_TTL).await;
        center.write().dismiss(id);
    });
}

#[component]
pub fn Toasts() -> Element {
    let mut center = use_notifications();
    let toasts = center.read().toasts().to_vec();

    rsx! {
        div { class: "toasts",
            for toast in toasts {
                div { key: "{toast.id}", class: toast.kind.class(), role: "status",
                    span { "{toast.message}" }
                    button {
                        r#type: "button",
                        "aria-label": "Dismiss",
                        onclick: move |_| {
                            center.write().dismiss(toast.id);
                        },
                        "×"
                    }
                }
            }
        }
    }
}
