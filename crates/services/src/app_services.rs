use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::assignment_service::AssignmentService;
use crate::error::AppServicesError;
use crate::lesson_service::LessonService;
use crate::progress::{ProgressService, TickerConfig};
use crate::quiz_service::QuizService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    lessons: Arc<LessonService>,
    progress: Arc<ProgressService>,
    quizzes: Arc<QuizService>,
    assignments: Arc<AssignmentService>,
    ticker: TickerConfig,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock))
    }

    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock) -> Self {
        Self {
            lessons: Arc::new(LessonService::new(clock, Arc::clone(&storage.lessons))),
            progress: Arc::new(ProgressService::new(clock, Arc::clone(&storage.progress))),
            quizzes: Arc::new(QuizService::new(Arc::clone(&storage.quizzes))),
            assignments: Arc::new(AssignmentService::new(
                clock,
                Arc::clone(&storage.assignments),
            )),
            ticker: TickerConfig::default(),
        }
    }

    #[must_use]
    pub fn with_ticker(mut self, ticker: TickerConfig) -> Self {
        self.ticker = ticker;
        self
    }

    #[must_use]
    pub fn lessons(&self) -> Arc<LessonService> {
        Arc::clone(&self.lessons)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<ProgressService> {
        Arc::clone(&self.progress)
    }

    #[must_use]
    pub fn quizzes(&self) -> Arc<QuizService> {
        Arc::clone(&self.quizzes)
    }

    #[must_use]
    pub fn assignments(&self) -> Arc<AssignmentService> {
        Arc::clone(&self.assignments)
    }

    #[must_use]
    pub fn ticker(&self) -> TickerConfig {
        self.ticker
    }
}
