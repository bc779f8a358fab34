//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use training_core::model::{AssignmentError, LessonError, LessonId, QuizError};
use training_core::ordering::OrderingError;
use training_core::preview::QuizPreviewError;
use training_core::progress::ProgressError;

/// Errors emitted by `LessonService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonServiceError {
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Ordering(#[from] OrderingError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("lesson {0} has no quiz")]
    NoQuizForLesson(LessonId),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Preview(#[from] QuizPreviewError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AssignmentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssignmentServiceError {
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
    /// A batch stopped partway; the first `applied` assignments stay stored.
    #[error("assigned {applied} of {total} before failing: {source}")]
    Partial {
        applied: usize,
        total: usize,
        #[source]
        source: StorageError,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
