use std::sync::Arc;

use storage::repository::{QuizRepository, StorageError};
use training_core::model::{LessonId, Quiz, QuizId};
use training_core::preview::QuizPreview;
use training_core::scoring::QuizScore;

use crate::error::QuizServiceError;

/// Loads quizzes into previews and records their results.
#[derive(Clone)]
pub struct QuizService {
    quizzes: Arc<dyn QuizRepository>,
}

impl QuizService {
    #[must_use]
    pub fn new(quizzes: Arc<dyn QuizRepository>) -> Self {
        Self { quizzes }
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if persistence fails.
    pub async fn save_quiz(&self, quiz: &Quiz) -> Result<(), QuizServiceError> {
        self.quizzes.upsert_quiz(quiz).await?;
        tracing::debug!(
            quiz_id = quiz.id().value(),
            questions = quiz.questions().len(),
            "quiz saved"
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` with `NotFound` when the quiz does not exist.
    pub async fn preview(&self, id: QuizId) -> Result<QuizPreview, QuizServiceError> {
        let quiz = self
            .quizzes
            .get_quiz(id)
            .await?
            .ok_or(StorageError::NotFound)?;
        Ok(QuizPreview::new(quiz))
    }

    /// Preview of the quiz attached to a lesson.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::NoQuizForLesson` when the lesson has none.
    pub async fn preview_for_lesson(
        &self,
        lesson_id: LessonId,
    ) -> Result<QuizPreview, QuizServiceError> {
        let quiz = self
            .quizzes
            .find_quiz_for_lesson(lesson_id)
            .await?
            .ok_or(QuizServiceError::NoQuizForLesson(lesson_id))?;
        Ok(QuizPreview::new(quiz))
    }

    /// Submit a preview and log the outcome.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Preview` if the preview was already submitted.
    pub fn submit(&self, preview: &mut QuizPreview) -> Result<QuizScore, QuizServiceError> {
        let score = preview.submit()?;
        tracing::info!(
            quiz_id = preview.quiz().id().value(),
            percentage = score.percentage,
            earned = score.earned_points,
            total = score.total_points,
            passed = score.passed,
            "quiz submitted"
        );
        Ok(score)
    }
}
