use services::{QuizService, QuizServiceError};
use training_core::model::{LessonId, QuestionKind};
use training_core::preview::{PreviewPhase, QuizPreview, QuizPreviewError};
use training_core::scoring::{QuizResponse, QuizScore};

use crate::views::ViewError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizIntent {
    Select(usize),
    Write(String),
    Next,
    Previous,
    Submit,
    Restart,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerVm {
    pub index: usize,
    pub text: String,
    pub selected: bool,
}

/// Current question as rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub counter: String,
    pub text: String,
    pub points: u32,
    pub free_text: bool,
    pub written: String,
    pub answers: Vec<AnswerVm>,
    pub is_first: bool,
    pub is_last: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreVm {
    pub headline: String,
    pub detail: String,
    pub passed: bool,
}

impl ScoreVm {
    #[must_use]
    pub fn from_score(score: QuizScore, question_count: usize) -> Self {
        let verdict = if score.passed { "Passed" } else { "Not passed" };
        Self {
            headline: format!("{verdict}: {}%", score.percentage),
            detail: format!(
                "{} of {question_count} correct, {} / {} points",
                score.correct_count, score.earned_points, score.total_points
            ),
            passed: score.passed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuizPreviewVm {
    preview: QuizPreview,
}

impl QuizPreviewVm {
    #[must_use]
    pub fn new(preview: QuizPreview) -> Self {
        Self { preview }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.preview.quiz().title()
    }

    #[must_use]
    pub fn passing_label(&self) -> String {
        format!("Passing score: {}%", self.preview.quiz().passing_score())
    }

    #[must_use]
    pub fn preview(&self) -> &QuizPreview {
        &self.preview
    }

    /// `None` once submitted, or for a quiz without questions.
    #[must_use]
    pub fn question(&self) -> Option<QuestionVm> {
        let index = self.preview.current_index()?;
        let question = self.preview.quiz().questions().get(index)?;
        let response = self.preview.responses().get(index);
        let selected = match response {
            Some(QuizResponse::Choice(choice)) => Some(*choice),
            _ => None,
        };
        let written = match response {
            Some(QuizResponse::Text(text)) => text.clone(),
            _ => String::new(),
        };
        Some(QuestionVm {
            counter: format!("Question {} of {}", index + 1, self.preview.question_count()),
            text: question.text.clone(),
            points: question.points,
            free_text: question.kind == QuestionKind::FreeText,
            written,
            answers: question
                .answers
                .iter()
                .enumerate()
                .map(|(i, answer)| AnswerVm {
                    index: i,
                    text: answer.text.clone(),
                    selected: selected == Some(i),
                })
                .collect(),
            is_first: index == 0,
            is_last: self.preview.is_last_question(),
        })
    }

    #[must_use]
    pub fn score(&self) -> Option<ScoreVm> {
        match self.preview.phase() {
            PreviewPhase::Submitted(score) => {
                Some(ScoreVm::from_score(score, self.preview.question_count()))
            }
            PreviewPhase::InProgress { .. } => None,
        }
    }

    /// # Errors
    ///
    /// Returns `ViewError::Unknown` when the preview rejects the intent
    /// (e.g. answering after submission).
    pub fn apply(&mut self, intent: QuizIntent, quizzes: &QuizService) -> Result<(), ViewError> {
        match intent {
            QuizIntent::Select(answer) => self.preview.select_answer(answer).map_err(rejected),
            QuizIntent::Write(text) => self.preview.write_answer(text).map_err(rejected),
            QuizIntent::Next => self.preview.next().map(drop).map_err(rejected),
            QuizIntent::Previous => self.preview.previous().map(drop).map_err(rejected),
            QuizIntent::Submit => quizzes
                .submit(&mut self.preview)
                .map(drop)
                .map_err(|_| ViewError::Unknown),
            QuizIntent::Restart => {
                self.preview.restart();
                Ok(())
            }
        }
    }
}

fn rejected(err: QuizPreviewError) -> ViewError {
    tracing::debug!(error = %err, "quiz intent rejected");
    ViewError::Unknown
}

/// Load the quiz attached to a lesson.
///
/// # Errors
///
/// Returns `ViewError::NoQuiz` when the lesson has no quiz.
pub async fn load_quiz_for_lesson(
    quizzes: &QuizService,
    lesson_id: LessonId,
) -> Result<QuizPreviewVm, ViewError> {
    match quizzes.preview_for_lesson(lesson_id).await {
        Ok(preview) => Ok(QuizPreviewVm::new(preview)),
        Err(QuizServiceError::NoQuizForLesson(_)) => Err(ViewError::NoQuiz),
        Err(_) => Err(ViewError::Unknown),
    }
}
