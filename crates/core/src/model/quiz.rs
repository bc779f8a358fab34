use thiserror::Error;

use crate::model::ids::{LessonId, QuizId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz title cannot be empty")]
    EmptyTitle,

    #[error("passing score must be between 0 and 100, got {0}")]
    InvalidPassingScore(u8),

    #[error("time limit must be > 0 minutes when set")]
    ZeroTimeLimit,

    #[error("question {index} has no text")]
    EmptyQuestion { index: usize },

    #[error("question {index} must be worth at least one point")]
    ZeroPoints { index: usize },

    #[error("question {index} needs at least two answers")]
    TooFewAnswers { index: usize },

    #[error("question {index} has no correct answer")]
    NoCorrectAnswer { index: usize },

    #[error("answer {answer} of question {question} has no text")]
    EmptyAnswer { question: usize, answer: usize },

    #[error("unknown question type: {0}")]
    UnknownQuestionKind(String),
}

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

/// Administrator-configured quiz rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSettings {
    passing_score: u8,
    time_limit_minutes: Option<u32>,
    is_active: bool,
}

impl QuizSettings {
    pub const DEFAULT_PASSING_SCORE: u8 = 80;

    /// # Errors
    ///
    /// Returns `QuizError::InvalidPassingScore` above 100 and
    /// `QuizError::ZeroTimeLimit` for a zero-minute limit.
    pub fn new(
        passing_score: u8,
        time_limit_minutes: Option<u32>,
        is_active: bool,
    ) -> Result<Self, QuizError> {
        if passing_score > 100 {
            return Err(QuizError::InvalidPassingScore(passing_score));
        }
        if time_limit_minutes == Some(0) {
            return Err(QuizError::ZeroTimeLimit);
        }
        Ok(Self {
            passing_score,
            time_limit_minutes,
            is_active,
        })
    }

    #[must_use]
    pub fn passing_score(&self) -> u8 {
        self.passing_score
    }

    #[must_use]
    pub fn time_limit_minutes(&self) -> Option<u32> {
        self.time_limit_minutes
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            passing_score: Self::DEFAULT_PASSING_SCORE,
            time_limit_minutes: None,
            is_active: true,
        }
    }
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionKind {
    MultipleChoice,
    FreeText,
}

impl QuestionKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice => "multiple_choice",
            QuestionKind::FreeText => "free_text",
        }
    }

    /// # Errors
    ///
    /// Returns `QuizError::UnknownQuestionKind` for unrecognised values.
    pub fn parse(raw: &str) -> Result<Self, QuizError> {
        match raw {
            "multiple_choice" => Ok(Self::MultipleChoice),
            "free_text" => Ok(Self::FreeText),
            other => Err(QuizError::UnknownQuestionKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub text: String,
    pub is_correct: bool,
    pub position: u32,
}

impl Answer {
    #[must_use]
    pub fn new(text: impl Into<String>, is_correct: bool, position: u32) -> Self {
        Self {
            text: text.into(),
            is_correct,
            position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub kind: QuestionKind,
    pub points: u32,
    pub position: u32,
    pub answers: Vec<Answer>,
}

impl Question {
    #[must_use]
    pub fn multiple_choice(
        text: impl Into<String>,
        points: u32,
        position: u32,
        answers: Vec<Answer>,
    ) -> Self {
        Self {
            text: text.into(),
            kind: QuestionKind::MultipleChoice,
            points,
            position,
            answers,
        }
    }

    #[must_use]
    pub fn free_text(text: impl Into<String>, points: u32, position: u32) -> Self {
        Self {
            text: text.into(),
            kind: QuestionKind::FreeText,
            points,
            position,
            answers: Vec::new(),
        }
    }

    /// Whether the answer at `index` is flagged correct. Out-of-range is false.
    #[must_use]
    pub fn is_correct_answer(&self, index: usize) -> bool {
        self.answers.get(index).is_some_and(|a| a.is_correct)
    }

    fn validate(&mut self, index: usize) -> Result<(), QuizError> {
        if self.text.trim().is_empty() {
            return Err(QuizError::EmptyQuestion { index });
        }
        if self.points == 0 {
            return Err(QuizError::ZeroPoints { index });
        }
        match self.kind {
            QuestionKind::FreeText => self.answers.clear(),
            QuestionKind::MultipleChoice => {
                if self.answers.len() < 2 {
                    return Err(QuizError::TooFewAnswers { index });
                }
                if let Some(answer) = self.answers.iter().position(|a| a.text.trim().is_empty()) {
                    return Err(QuizError::EmptyAnswer {
                        question: index,
                        answer,
                    });
                }
                if !self.answers.iter().any(|a| a.is_correct) {
                    return Err(QuizError::NoCorrectAnswer { index });
                }
                self.answers.sort_by_key(|a| a.position);
            }
        }
        Ok(())
    }
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// A quiz attached to an interactive lesson.
///
/// Questions and answers are kept sorted by their ordinal position, so
/// indices used by the scorer follow display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    id: QuizId,
    lesson_id: Option<LessonId>,
    title: String,
    description: String,
    settings: QuizSettings,
    questions: Vec<Question>,
}

impl Quiz {
    /// # Errors
    ///
    /// Returns `QuizError` if the title is blank or any question is malformed.
    pub fn new(
        id: QuizId,
        lesson_id: Option<LessonId>,
        title: impl Into<String>,
        description: impl Into<String>,
        settings: QuizSettings,
        mut questions: Vec<Question>,
    ) -> Result<Self, QuizError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(QuizError::EmptyTitle);
        }
        questions.sort_by_key(|q| q.position);
        for (index, question) in questions.iter_mut().enumerate() {
            question.validate(index)?;
        }

        Ok(Self {
            id,
            lesson_id,
            title: title.trim().to_string(),
            description: description.into(),
            settings,
            questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn lesson_id(&self) -> Option<LessonId> {
        self.lesson_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn passing_score(&self) -> u8 {
        self.settings.passing_score()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.questions
            .iter()
            .map(|q| q.points)
            .fold(0, u32::saturating_add)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
