use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use crate::views::{
    AssignView, HomeView, LessonView, LessonsView, QuizView, Toasts, use_notification_provider,
};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/lessons", LessonsView)] Lessons {},
        #[route("/lessons/:lesson_id", LessonView)] Lesson { lesson_id: u64 },
        #[route("/lessons/:lesson_id/quiz", QuizView)] Quiz { lesson_id: u64 },
        #[route("/assign", AssignView)] Assign {},
}

#[component]
fn Layout() -> Element {
    use_notification_provider();
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
            Toasts {}
        }
    }
}

#[component]
fn Sidebar() -> Element {
    rsx! {
        nav { class: "sidebar",
            h1 { "Training" }
            ul {
                li { Link { to: Route::Home {}, "Home" } }
                li { Link { to: Route::Lessons {}, "Lessons" } }
                li { Link { to: Route::Assign {}, "Assign" } }
            }
        }
    }
}
