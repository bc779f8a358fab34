use dioxus::prelude::*;

use services::AssignmentServiceError;
use training_core::model::{Assignee, Assignment, TargetMode};

use crate::context::AppContext;
use crate::views::toasts::{notify, use_notifications};
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{
    AssignmentFormVm, ToastKind, assignment_error_message, assignment_success_message,
    format_datetime,
};

fn assignee_label(assignee: Assignee) -> String {
    match assignee {
        Assignee::User(user) => format!("User {user}"),
        Assignee::Group(group) => format!("Group {group}"),
    }
}

#[component]
pub fn AssignView() -> Element {
    let ctx = use_context::<AppContext>();
    let notifications = use_notifications();
    let formation_id = ctx.formation_id();
    let assignments = ctx.assignments();

    let resource = {
        let assignments = assignments.clone();
        use_resource(move || {
            let assignments = assignments.clone();
            async move {
                assignments
                    .list(formation_id)
                    .await
                    .map_err(|_| ViewError::Unknown)
            }
        })
    };
    let state = view_state_from_resource(resource);

    let mut form = use_signal(AssignmentFormVm::default);
    let mut form_error = use_signal(|| None::<String>);
    let mut submitting = use_signal(|| false);

    let on_submit = use_callback(move |()| {
        if submitting() {
            return;
        }
        let draft = match form.read().to_draft(formation_id) {
            Ok(draft) => draft,
            Err(err) => {
                form_error.set(Some(err.message()));
                return;
            }
        };
        let assignments = assignments.clone();
        let mut resource = resource;
        submitting.set(true);
        spawn(async move {
            match assignments.assign(draft).await {
                Ok(report) => {
                    form_error.set(None);
                    form.set(AssignmentFormVm::default());
                    notify(notifications, ToastKind::Success, assignment_success_message(report));
                }
                Err(err) => {
                    let message = assignment_error_message(&err);
                    if matches!(err, AssignmentServiceError::Assignment(_)) {
                        form_error.set(Some(message));
                    } else {
                        notify(notifications, ToastKind::Error, message);
                    }
                }
            }
            submitting.set(false);
            resource.restart();
        });
    });

    let mode = form.read().mode;

    rsx! {
        div { class: "page",
            h2 { "Assign formation {formation_id}" }

            form {
                class: "assign-form",
                onsubmit: move |evt| {
                    evt.prevent_default();
                    on_submit.call(());
                },
                fieldset {
                    legend { "Assign to" }
                    label {
                        input {
                            r#type: "radio",
                            name: "target",
                            checked: mode == TargetMode::Users,
                            onchange: move |_| form.write().mode = TargetMode::Users,
                        }
                        "Collaborators"
                    }
                    label {
                        input {
                            r#type: "radio",
                            name: "target",
                            checked: mode == TargetMode::Group,
                            onchange: move |_| form.write().mode = TargetMode::Group,
                        }
                        "Group"
                    }
                }

                if mode == TargetMode::Users {
                    label { "User ids"
                        input {
                            value: "{form.read().users_input}",
                            placeholder: "e.g. 3, 8, 12",
                            oninput: move |evt| form.write().users_input = evt.value(),
                        }
                    }
                } else {
                    label { "Group id"
                        input {
                            value: "{form.read().group_input}",
                            oninput: move |evt| form.write().group_input = evt.value(),
                        }
                    }
                }

                label { "Due date"
                    input {
                        r#type: "date",
                        value: "{form.read().due_input}",
                        oninput: move |evt| form.write().due_input = evt.value(),
                    }
                }

                if let Some(message) = form_error() {
                    p { class: "field-error", "{message}" }
                }
                button { r#type: "submit", disabled: submitting(), "Assign" }
            }

            h3 { "Current assignments" }
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(items) => rsx! {
                    if items.is_empty() {
                        p { "Nobody is assigned yet." }
                    } else {
                        ul { class: "assignment-list",
                            for item in items {
                                AssignmentRow { item }
                            }
                        }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                },
            }
        }
    }
}

#[component]
fn AssignmentRow(item: Assignment) -> Element {
    let who = assignee_label(item.assignee);
    let assigned = format_datetime(item.assigned_at);
    rsx! {
        li {
            span { "{who}" }
            span { " · assigned {assigned}" }
            if let Some(due) = item.due_at {
                span { " · due {format_datetime(due)}" }
            }
        }
    }
}
