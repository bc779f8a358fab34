use dioxus::prelude::*;

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};

#[derive(Clone, Debug, PartialEq)]
struct HomeData {
    lessons: usize,
    completed: usize,
    in_progress: usize,
    assignments: usize,
}

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let user_id = ctx.user_id();
    let formation_id = ctx.formation_id();
    let section_id = ctx.section_id();

    let resource = use_resource(move || {
        let lessons = ctx.lessons();
        let progress = ctx.progress();
        let assignments = ctx.assignments();
        async move {
            let lessons = lessons
                .list_lessons(section_id)
                .await
                .map_err(|_| ViewError::Unknown)?;
            let records = progress
                .list_for_user(user_id, formation_id)
                .await
                .map_err(|_| ViewError::Unknown)?;
            let assigned = assignments
                .list(formation_id)
                .await
                .map_err(|_| ViewError::Unknown)?;

            let completed = records.iter().filter(|r| r.is_completed()).count();
            Ok(HomeData {
                lessons: lessons.len(),
                completed,
                in_progress: records.len() - completed,
                assignments: assigned.len(),
            })
        }
    });

    let state = view_state_from_resource(resource);

    rsx! {
        div { class: "page",
            h2 { "Home" }
            p { "Formation {formation_id} · learner {user_id}" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(data) => rsx! {
                    ul { class: "dashboard",
                        li { "Lessons completed: {data.completed} of {data.lessons}" }
                        li { "In progress: {data.in_progress}" }
                        li { "Assignments: {data.assignments}" }
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                },
            }
        }
    }
}
