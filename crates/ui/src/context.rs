use std::sync::Arc;

use services::{
    AppServices, AssignmentService, LessonService, ProgressService, QuizService, TickerConfig,
};
use training_core::model::{FormationId, SectionId, UserId};

use crate::platform::ContentOpenerRef;

/// What the composition root hands to the UI.
pub trait UiApp: Send + Sync {
    fn user_id(&self) -> UserId;
    fn formation_id(&self) -> FormationId;
    fn section_id(&self) -> SectionId;

    fn services(&self) -> AppServices;
    fn content_opener(&self) -> ContentOpenerRef;
}

#[derive(Clone)]
pub struct AppContext {
    user_id: UserId,
    formation_id: FormationId,
    section_id: SectionId,
    services: AppServices,
    opener: ContentOpenerRef,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            user_id: app.user_id(),
            formation_id: app.formation_id(),
            section_id: app.section_id(),
            services: app.services(),
            opener: app.content_opener(),
        }
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn formation_id(&self) -> FormationId {
        self.formation_id
    }

    #[must_use]
    pub fn section_id(&self) -> SectionId {
        self.section_id
    }

    #[must_use]
    pub fn lessons(&self) -> Arc<LessonService> {
        self.services.lessons()
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        self.services.progress()
    }

    #[must_use]
    pub fn quizzes(&self) -> Arc<QuizService> {
        self.services.quizzes()
    }

    #[must_use]
    pub fn assignments(&self) -> Arc<AssignmentService> {
        self.services.assignments()
    }

    #[must_use]
    pub fn ticker_config(&self) -> TickerConfig {
        self.services.ticker()
    }

    #[must_use]
    pub fn opener(&self) -> ContentOpenerRef {
        Arc::clone(&self.opener)
    }
}

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
