use std::sync::{Arc, Mutex};
use std::time::Duration;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use services::{AppServices, Clock, TickerConfig};
use training_core::model::{
    Answer, FormationId, Lesson, LessonDraft, LessonId, LessonKind, LessonMetadata, Question,
    Quiz, QuizId, QuizSettings, SectionId, UserId,
};
use training_core::time::fixed_now;

use crate::context::{UiApp, build_app_context};
use crate::platform::{ContentOpener, ContentOpenerRef};
use crate::views::lesson_viewer::ViewerTestHandles;
use crate::views::quiz_preview::QuizTestHandles;
use crate::views::{
    AssignView, HomeView, LessonView, LessonsView, QuizView, Toasts, use_notification_provider,
};

pub const USER: UserId = UserId::new(1);
pub const FORMATION: FormationId = FormationId::new(1);
pub const SECTION: SectionId = SectionId::new(1);

#[derive(Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().unwrap().clone()
    }
}

impl ContentOpener for RecordingOpener {
    fn open(&self, target: &str) {
        self.opened.lock().unwrap().push(target.to_string());
    }
}

#[derive(Clone)]
struct TestApp {
    services: AppServices,
    opener: Arc<RecordingOpener>,
}

impl UiApp for TestApp {
    fn user_id(&self) -> UserId {
        USER
    }

    fn formation_id(&self) -> FormationId {
        FORMATION
    }

    fn section_id(&self) -> SectionId {
        SECTION
    }

    fn services(&self) -> AppServices {
        self.services.clone()
    }

    fn content_opener(&self) -> ContentOpenerRef {
        self.opener.clone()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    Lessons,
    Lesson(u64),
    Quiz(u64),
    Assign,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
    viewer_handles: ViewerTestHandles,
    quiz_handles: QuizTestHandles,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    use_context_provider(|| props.viewer_handles.clone());
    use_context_provider(|| props.quiz_handles.clone());
    use_notification_provider();
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    rsx! {
        match view {
            ViewKind::Home => rsx! { HomeView {} },
            ViewKind::Lessons => rsx! { LessonsView {} },
            ViewKind::Lesson(lesson_id) => rsx! { LessonView { lesson_id } },
            ViewKind::Quiz(lesson_id) => rsx! { QuizView { lesson_id } },
            ViewKind::Assign => rsx! { AssignView {} },
        }
        Toasts {}
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub services: AppServices,
    pub opener: Arc<RecordingOpener>,
    pub viewer_handles: ViewerTestHandles,
    pub quiz_handles: QuizTestHandles,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(Duration::from_millis(50), self.dom.wait_for_work()).await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Rebuild, then let resources resolve.
    pub async fn settle(&mut self) {
        self.rebuild();
        for _ in 0..3 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// In-memory services on a fixed clock, with a fast ticker.
pub fn test_services() -> AppServices {
    AppServices::in_memory(Clock::fixed(fixed_now())).with_ticker(TickerConfig {
        period: Duration::from_millis(10),
    })
}

pub fn mount(view: ViewKind, services: AppServices) -> ViewHarness {
    let opener = Arc::new(RecordingOpener::default());
    let viewer_handles = ViewerTestHandles::default();
    let quiz_handles = QuizTestHandles::default();
    let app = Arc::new(TestApp {
        services: services.clone(),
        opener: Arc::clone(&opener),
    });

    let dom = VirtualDom::new_with_props(
        ViewRouterHarness,
        ViewHarnessProps {
            app,
            view,
            viewer_handles: viewer_handles.clone(),
            quiz_handles: quiz_handles.clone(),
        },
    );

    ViewHarness {
        dom,
        services,
        opener,
        viewer_handles,
        quiz_handles,
    }
}

pub async fn seed_lesson(services: &AppServices, draft: LessonDraft) -> Lesson {
    services
        .lessons()
        .create_lesson(draft)
        .await
        .expect("create lesson")
}

pub async fn seed_document(services: &AppServices, title: &str, pages: u32) -> Lesson {
    let meta = LessonMetadata::url("https://docs.example.com/handbook.pdf")
        .expect("url")
        .with_pages(pages)
        .expect("pages");
    seed_lesson(
        services,
        LessonDraft::new(SECTION, title, LessonKind::Document).with_metadata(meta),
    )
    .await
}

/// Two one-point multiple-choice questions; the first answer is correct.
pub async fn seed_quiz(services: &AppServices, lesson_id: LessonId) -> Quiz {
    let question = |text: &str, position| {
        Question::multiple_choice(
            text,
            1,
            position,
            vec![Answer::new("Yes", true, 0), Answer::new("No", false, 1)],
        )
    };
    let quiz = Quiz::new(
        QuizId::new(1),
        Some(lesson_id),
        "Checkpoint",
        "",
        QuizSettings::default(),
        vec![question("Is the exit marked?", 0), question("Is the kit stocked?", 1)],
    )
    .expect("quiz");
    services.quizzes().save_quiz(&quiz).await.expect("save quiz");
    quiz
}
