use thiserror::Error;

use crate::model::{
    AssignmentError, LessonError, MetadataError, ProgressRecordError, QuizError,
};
use crate::ordering::OrderingError;
use crate::preview::QuizPreviewError;
use crate::progress::ProgressError;

/// Any domain validation failure, for callers that do not care which rule tripped.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Preview(#[from] QuizPreviewError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    ProgressRecord(#[from] ProgressRecordError),
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
    #[error(transparent)]
    Ordering(#[from] OrderingError),
}
