use dioxus::prelude::*;
use dioxus_router::Link;

use training_core::model::{LessonDraft, LessonId, LessonKind};

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::toasts::{notify, use_notifications};
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{LessonListItemVm, ToastKind, kind_label, map_lesson_list};

const KINDS: [LessonKind; 4] = [
    LessonKind::Video,
    LessonKind::Document,
    LessonKind::Presentation,
    LessonKind::Interactive,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Move {
    Up(usize),
    Down(usize),
}

#[component]
pub fn LessonsView() -> Element {
    let ctx = use_context::<AppContext>();
    let notifications = use_notifications();
    let section_id = ctx.section_id();
    let user_id = ctx.user_id();
    let formation_id = ctx.formation_id();

    let resource = {
        let ctx = ctx.clone();
        use_resource(move || {
            let lessons = ctx.lessons();
            let progress = ctx.progress();
            async move {
                let lessons = lessons
                    .list_lessons(section_id)
                    .await
                    .map_err(|_| ViewError::Unknown)?;
                let records = progress
                    .list_for_user(user_id, formation_id)
                    .await
                    .map_err(|_| ViewError::Unknown)?;
                Ok(map_lesson_list(&lessons, &records))
            }
        })
    };
    let state = view_state_from_resource(resource);

    let mut title = use_signal(String::new);
    let mut kind = use_signal(|| LessonKind::Video);
    let mut duration = use_signal(String::new);
    let mut form_error = use_signal(|| None::<String>);

    let on_move = {
        let ctx = ctx.clone();
        use_callback(move |step: Move| {
            let lessons = ctx.lessons();
            let mut resource = resource;
            let (from, to) = match step {
                Move::Up(index) => (index, index.saturating_sub(1)),
                Move::Down(index) => (index, index + 1),
            };
            spawn(async move {
                if let Err(err) = lessons.reorder(section_id, from, to).await {
                    tracing::warn!(error = %err, from, to, "reorder failed");
                    notify(notifications, ToastKind::Error, "Could not reorder lessons.");
                }
                resource.restart();
            });
        })
    };

    let on_delete = {
        let ctx = ctx.clone();
        use_callback(move |id: LessonId| {
            let lessons = ctx.lessons();
            let mut resource = resource;
            spawn(async move {
                match lessons.delete_lesson(id).await {
                    Ok(()) => notify(notifications, ToastKind::Success, "Lesson deleted."),
                    Err(_) => notify(notifications, ToastKind::Error, "Could not delete lesson."),
                }
                resource.restart();
            });
        })
    };

    let on_create = use_callback(move |()| {
        let minutes = duration.read().trim().to_string();
        let minutes = if minutes.is_empty() {
            0
        } else if let Ok(value) = minutes.parse::<u32>() {
            value
        } else {
            form_error.set(Some("Duration must be a whole number of minutes.".to_string()));
            return;
        };
        let draft = LessonDraft::new(section_id, title.read().clone(), kind())
            .with_duration(minutes);
        let lessons = ctx.lessons();
        let mut resource = resource;
        spawn(async move {
            match lessons.create_lesson(draft).await {
                Ok(lesson) => {
                    form_error.set(None);
                    title.set(String::new());
                    duration.set(String::new());
                    notify(
                        notifications,
                        ToastKind::Success,
                        format!("Added \"{}\".", lesson.title()),
                    );
                    resource.restart();
                }
                Err(err) => form_error.set(Some(err.to_string())),
            }
        });
    });

    rsx! {
        div { class: "page",
            h2 { "Lessons" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(items) => rsx! {
                    if items.is_empty() {
                        p { "No lessons in this section yet." }
                    } else {
                        ol { class: "lesson-list",
                            for (index, item) in items.iter().cloned().enumerate() {
                                LessonRow {
                                    key: "{item.id}",
                                    item,
                                    can_move_up: index > 0,
                                    can_move_down: index + 1 < items.len(),
                                    on_up: move |()| on_move.call(Move::Up(index)),
                                    on_down: move |()| on_move.call(Move::Down(index)),
                                    on_delete,
                                }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                },
            }

            form {
                class: "lesson-form",
                onsubmit: move |evt| {
                    evt.prevent_default();
                    on_create.call(());
                },
                h3 { "Add lesson" }
                label { "Title"
                    input {
                        value: "{title}",
                        oninput: move |evt| title.set(evt.value()),
                    }
                }
                label { "Type"
                    select {
                        value: "{kind().as_str()}",
                        onchange: move |evt| {
                            if let Ok(parsed) = LessonKind::parse(&evt.value()) {
                                kind.set(parsed);
                            }
                        },
                        for choice in KINDS {
                            option { value: "{choice.as_str()}", "{kind_label(choice)}" }
                        }
                    }
                }
                label { "Duration (minutes)"
                    input {
                        value: "{duration}",
                        oninput: move |evt| duration.set(evt.value()),
                    }
                }
                if let Some(message) = form_error() {
                    p { class: "field-error", "{message}" }
                }
                button { r#type: "submit", "Add" }
            }
        }
    }
}

#[component]
fn LessonRow(
    item: LessonListItemVm,
    can_move_up: bool,
    can_move_down: bool,
    on_up: EventHandler<()>,
    on_down: EventHandler<()>,
    on_delete: EventHandler<LessonId>,
) -> Element {
    let id = item.id;
    rsx! {
        li {
            Link { to: Route::Lesson { lesson_id: id.value() }, "{item.title}" }
            span { class: "lesson-kind", " {item.kind}" }
            if let Some(duration) = item.duration_label {
                span { " · {duration}" }
            }
            if item.completed {
                span { class: "badge-complete", "Completed" }
            } else if item.progress_pct > 0 {
                span { " · {item.progress_pct}%" }
            }
            Link { to: Route::Quiz { lesson_id: id.value() }, "Quiz" }
            button {
                r#type: "button",
                disabled: !can_move_up,
                onclick: move |_| on_up.call(()),
                "Up"
            }
            button {
                r#type: "button",
                disabled: !can_move_down,
                onclick: move |_| on_down.call(()),
                "Down"
            }
            button {
                r#type: "button",
                onclick: move |_| on_delete.call(id),
                "Delete"
            }
        }
    }
}
