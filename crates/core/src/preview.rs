//! Quiz preview flow.
//!
//! `InProgress(index)` moves with `next`/`previous` inside the question
//! range. `submit` enters the terminal `Submitted` phase and computes the
//! score; only `restart` leaves it, clearing every response.

use thiserror::Error;

use crate::model::{QuestionKind, Quiz};
use crate::scoring::{QuizResponses, QuizScore, score_quiz};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizPreviewError {
    #[error("quiz already submitted; restart to answer again")]
    AlreadySubmitted,
    #[error("answer {answer} does not exist for question {question}")]
    NoSuchAnswer { question: usize, answer: usize },
    #[error("question {0} is not a free-text question")]
    NotFreeText(usize),
    #[error("question {0} is not a multiple-choice question")]
    NotMultipleChoice(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewPhase {
    InProgress { question_index: usize },
    Submitted(QuizScore),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizPreview {
    quiz: Quiz,
    responses: QuizResponses,
    phase: PreviewPhase,
}

impl QuizPreview {
    #[must_use]
    pub fn new(quiz: Quiz) -> Self {
        Self {
            quiz,
            responses: QuizResponses::new(),
            phase: PreviewPhase::InProgress { question_index: 0 },
        }
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn phase(&self) -> PreviewPhase {
        self.phase
    }

    #[must_use]
    pub fn responses(&self) -> &QuizResponses {
        &self.responses
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.quiz.questions().len()
    }

    /// Current question index, or `None` once submitted.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        match self.phase {
            PreviewPhase::InProgress { question_index } => Some(question_index),
            PreviewPhase::Submitted(_) => None,
        }
    }

    #[must_use]
    pub fn score(&self) -> Option<QuizScore> {
        match self.phase {
            PreviewPhase::Submitted(score) => Some(score),
            PreviewPhase::InProgress { .. } => None,
        }
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current_index()
            .is_some_and(|i| i + 1 >= self.question_count())
    }

    fn in_progress_index(&self) -> Result<usize, QuizPreviewError> {
        self.current_index().ok_or(QuizPreviewError::AlreadySubmitted)
    }

    /// Select an answer for the current multiple-choice question.
    ///
    /// # Errors
    ///
    /// Returns `QuizPreviewError` after submission, for a free-text question,
    /// or for an answer index past the end.
    pub fn select_answer(&mut self, answer: usize) -> Result<(), QuizPreviewError> {
        let question = self.in_progress_index()?;
        let Some(q) = self.quiz.questions().get(question) else {
            return Err(QuizPreviewError::NoSuchAnswer { question, answer });
        };
        if q.kind != QuestionKind::MultipleChoice {
            return Err(QuizPreviewError::NotMultipleChoice(question));
        }
        if answer >= q.answers.len() {
            return Err(QuizPreviewError::NoSuchAnswer { question, answer });
        }
        self.responses.select(question, answer);
        Ok(())
    }

    /// Record free text for the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizPreviewError` after submission or when the question is not free-text.
    pub fn write_answer(&mut self, text: impl Into<String>) -> Result<(), QuizPreviewError> {
        let question = self.in_progress_index()?;
        match self.quiz.questions().get(question) {
            Some(q) if q.kind == QuestionKind::FreeText => {
                self.responses.write(question, text);
                Ok(())
            }
            _ => Err(QuizPreviewError::NotFreeText(question)),
        }
    }

    /// Advance one question, stopping at the last one.
    ///
    /// # Errors
    ///
    /// Returns `QuizPreviewError::AlreadySubmitted` after submission.
    pub fn next(&mut self) -> Result<usize, QuizPreviewError> {
        let index = self.in_progress_index()?;
        let last = self.question_count().saturating_sub(1);
        let next = (index + 1).min(last);
        self.phase = PreviewPhase::InProgress {
            question_index: next,
        };
        Ok(next)
    }

    /// Step back one question, stopping at the first one.
    ///
    /// # Errors
    ///
    /// Returns `QuizPreviewError::AlreadySubmitted` after submission.
    pub fn previous(&mut self) -> Result<usize, QuizPreviewError> {
        let index = self.in_progress_index()?;
        let prev = index.saturating_sub(1);
        self.phase = PreviewPhase::InProgress {
            question_index: prev,
        };
        Ok(prev)
    }

    /// Finish the attempt and compute the score.
    ///
    /// # Errors
    ///
    /// Returns `QuizPreviewError::AlreadySubmitted` if called twice.
    pub fn submit(&mut self) -> Result<QuizScore, QuizPreviewError> {
        self.in_progress_index()?;
        let score = score_quiz(
            self.quiz.questions(),
            &self.responses,
            self.quiz.passing_score(),
        );
        self.phase = PreviewPhase::Submitted(score);
        Ok(score)
    }

    pub fn restart(&mut self) {
        self.responses.clear();
        self.phase = PreviewPhase::InProgress { question_index: 0 };
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
