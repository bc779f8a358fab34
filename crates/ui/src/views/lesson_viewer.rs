use std::sync::Arc;

use dioxus::prelude::*;
use dioxus_router::Link;
use tokio::sync::watch;

use services::{ProgressService, ProgressTicker};
use training_core::model::LessonId;
use training_core::progress::ProgressSnapshot;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::toasts::{notify, use_notifications};
use crate::views::{ViewState, view_state_from_resource};
use crate::vm::{
    LessonViewerVm, NotificationCenter, ToastKind, ViewerIntent, format_elapsed, open_viewer,
    whole_percent,
};

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::rc::Rc;

/// Persist every published snapshot until the ticker goes away.
async fn persist_snapshots(
    mut rx: watch::Receiver<ProgressSnapshot>,
    vm: LessonViewerVm,
    progress: Arc<ProgressService>,
    mut latest: Signal<ProgressSnapshot>,
    notifications: Signal<NotificationCenter>,
) {
    let mut failed = false;
    while rx.changed().await.is_ok() {
        let snapshot = *rx.borrow_and_update();
        latest.set(snapshot);
        match progress.record_snapshot(vm.key(), &vm.tracker_state()).await {
            Ok(_) => failed = false,
            Err(err) => {
                tracing::warn!(error = %err, "progress not saved");
                // One toast per outage, not one per tick.
                if !failed {
                    notify(notifications, ToastKind::Error, "Progress could not be saved.");
                }
                failed = true;
            }
        }
    }
}

#[component]
pub fn LessonView(lesson_id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let notifications = use_notifications();
    let lesson_id = LessonId::new(lesson_id);
    let formation_id = ctx.formation_id();
    let user_id = ctx.user_id();
    let ticker_config = ctx.ticker_config();
    let opener = ctx.opener();

    let resource = {
        let ctx = ctx.clone();
        use_resource(move || {
            let lessons = ctx.lessons();
            let progress = ctx.progress();
            async move { open_viewer(&lessons, &progress, lesson_id, formation_id, user_id).await }
        })
    };
    let state = view_state_from_resource(resource);

    let mut ticker = use_signal(|| None::<ProgressTicker>);
    let mut latest = use_signal(ProgressSnapshot::default);
    let mut revision = use_signal(|| 0_u64);

    // Start tracking once the lesson is loaded. The ticker lives in this
    // component's scope and is dropped (cancelled) with it.
    use_effect(move || {
        let loaded = resource
            .value()
            .read()
            .as_ref()
            .and_then(|result| result.as_ref().ok().cloned());
        let Some(vm) = loaded else {
            return;
        };
        if ticker.peek().is_some() {
            return;
        }
        if let Err(err) = vm.apply(ViewerIntent::Start) {
            tracing::warn!(error = %err, "viewer failed to start");
        }
        let handle = ProgressTicker::spawn(vm.tracker(), ticker_config);
        let rx = handle.subscribe();
        latest.set(handle.current());
        ticker.set(Some(handle));
        spawn(persist_snapshots(rx, vm, ctx.progress(), latest, notifications));
    });

    let dispatch_intent = use_callback(move |intent: ViewerIntent| {
        let loaded = resource
            .value()
            .peek()
            .as_ref()
            .and_then(|result| result.as_ref().ok().cloned());
        let Some(vm) = loaded else {
            return;
        };
        if let Err(err) = vm.apply(intent) {
            tracing::debug!(error = %err, ?intent, "viewer intent rejected");
            notify(notifications, ToastKind::Error, "That position is not valid.");
            return;
        }
        latest.set(vm.snapshot());
        revision += 1;
    });

    #[cfg(test)]
    {
        let mut registered = use_signal(|| false);
        if !registered() {
            registered.set(true);
            if let Some(handles) = try_consume_context::<ViewerTestHandles>() {
                handles.register(dispatch_intent);
            }
        }
    }

    // Re-read the tracker whenever an intent changed it.
    let _ = revision();
    let snapshot = latest();

    rsx! {
        div { class: "page",
            Link { to: Route::Lessons {}, "Back to lessons" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(vm) => rsx! {
                    h2 { "{vm.title()}" }
                    p { class: "lesson-kind", "{vm.kind_label()}" }
                    div { class: "lesson-description", dangerous_inner_html: "{vm.description_html()}" }

                    if let Some(note) = vm.placeholder_note() {
                        p { class: "placeholder-note", "{note}" }
                    }
                    if let Some(note) = vm.tracking_note() {
                        p { class: "tracking-note", "{note}" }
                    }
                    if vm.previously_completed() {
                        p { class: "badge-complete", "Completed before" }
                    }

                    if let Some(target) = vm.content_target().map(str::to_string) {
                        button {
                            r#type: "button",
                            onclick: {
                                let opener = opener.clone();
                                move |_| opener.open(&target)
                            },
                            "Open content"
                        }
                    }

                    if let Some((position, total)) = vm.seek_range() {
                        input {
                            class: "viewer-seek",
                            r#type: "range",
                            min: "0",
                            max: "{total}",
                            value: "{position}",
                            oninput: move |evt| {
                                if let Ok(secs) = evt.value().parse::<f64>() {
                                    dispatch_intent.call(ViewerIntent::Seek(secs));
                                }
                            },
                        }
                    }

                    div { class: "viewer-controls",
                        button {
                            r#type: "button",
                            onclick: move |_| dispatch_intent.call(ViewerIntent::PreviousUnit),
                            "Previous"
                        }
                        span { class: "viewer-position", "{vm.position_label()}" }
                        button {
                            r#type: "button",
                            onclick: move |_| dispatch_intent.call(ViewerIntent::NextUnit),
                            "Next"
                        }
                        button {
                            r#type: "button",
                            onclick: move |_| dispatch_intent.call(ViewerIntent::Complete),
                            "Mark as done"
                        }
                        button {
                            r#type: "button",
                            onclick: move |_| dispatch_intent.call(ViewerIntent::Restart),
                            "Restart"
                        }
                    }

                    ProgressPanel { snapshot }
                    Link { to: Route::Quiz { lesson_id: lesson_id.value() }, "Take the quiz" }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                },
            }
        }
    }
}

#[component]
fn ProgressPanel(snapshot: ProgressSnapshot) -> Element {
    let pct = whole_percent(snapshot.progress);
    rsx! {
        div { class: "progress",
            div { class: "progress-bar",
                div { class: "fill", style: "width: {pct}%" }
            }
            p { "Progress: {pct}%" }
            p { "{format_elapsed(snapshot.time_spent_secs)}" }
            if snapshot.completed {
                p { class: "badge-complete", "Completed" }
            }
        }
    }
}

#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct ViewerTestHandles {
    dispatch: Rc<RefCell<Option<Callback<ViewerIntent>>>>,
}

#[cfg(test)]
impl ViewerTestHandles {
    pub(crate) fn register(&self, dispatch: Callback<ViewerIntent>) {
        *self.dispatch.borrow_mut() = Some(dispatch);
    }

    pub(crate) fn dispatch(&self) -> Callback<ViewerIntent> {
        (*self.dispatch.borrow()).expect("viewer dispatch registered")
    }
}
