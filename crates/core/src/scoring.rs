use std::collections::BTreeMap;

use crate::model::{Question, QuestionKind};

/// A learner's response to one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizResponse {
    /// Index into the question's ordered answers.
    Choice(usize),
    Text(String),
}

/// Responses keyed by question index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuizResponses(BTreeMap<usize, QuizResponse>);

impl QuizResponses {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, question: usize, answer: usize) {
        self.0.insert(question, QuizResponse::Choice(answer));
    }

    pub fn write(&mut self, question: usize, text: impl Into<String>) {
        self.0.insert(question, QuizResponse::Text(text.into()));
    }

    #[must_use]
    pub fn get(&self, question: usize) -> Option<&QuizResponse> {
        self.0.get(&question)
    }

    #[must_use]
    pub fn selected(&self, question: usize) -> Option<usize> {
        match self.0.get(&question) {
            Some(QuizResponse::Choice(index)) => Some(*index),
            _ => None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Derived result of a quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizScore {
    pub correct_count: usize,
    pub earned_points: u32,
    pub total_points: u32,
    pub percentage: u32,
    pub passed: bool,
}

/// Whether a question counts toward earned points.
///
/// Free-text questions always count, pending manual grading. Multiple-choice
/// questions count only when the selected answer is flagged correct.
#[must_use]
pub fn is_counted_correct(question: &Question, response: Option<&QuizResponse>) -> bool {
    match question.kind {
        QuestionKind::FreeText => true,
        QuestionKind::MultipleChoice => match response {
            Some(QuizResponse::Choice(index)) => question.is_correct_answer(*index),
            Some(QuizResponse::Text(_)) | None => false,
        },
    }
}

/// Score `responses` against `questions` (in display order).
#[must_use]
pub fn score_quiz(questions: &[Question], responses: &QuizResponses, passing_score: u8) -> QuizScore {
    let mut correct_count = 0;
    let mut earned_points: u32 = 0;
    let mut total_points: u32 = 0;

    for (index, question) in questions.iter().enumerate() {
        total_points = total_points.saturating_add(question.points);
        if is_counted_correct(question, responses.get(index)) {
            correct_count += 1;
            earned_points = earned_points.saturating_add(question.points);
        }
    }

    let percentage = percentage_of(earned_points, total_points);
    QuizScore {
        correct_count,
        earned_points,
        total_points,
        percentage,
        passed: percentage >= u32::from(passing_score),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percentage_of(earned: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    // earned <= total, so the rounded value stays within 0..=100.
    (f64::from(earned) / f64::from(total) * 100.0).round() as u32
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Answer;

    fn mc(points: u32) -> Question {
        Question::multiple_choice(
            "Which?",
            points,
            0,
            vec![Answer::new("right", true, 0), Answer::new("wrong", false, 1)],
        )
    }

    #[test]
    fn two_questions_both_correct_pass() {
        let questions = vec![mc(1), mc(1)];
        let mut responses = QuizResponses::new();
        responses.select(0, 0);
        responses.select(1, 0);

        let score = score_quiz(&questions, &responses, 80);
        assert_eq!(score.percentage, 100);
        assert!(score.passed);
        assert_eq!(score.correct_count, 2);
    }

    #[test]
    fn two_questions_one_correct_fails() {
        let questions = vec![mc(1), mc(1)];
        let mut responses = QuizResponses::new();
        responses.select(0, 0);
        responses.select(1, 1);

        let score = score_quiz(&questions, &responses, 80);
        assert_eq!(score.percentage, 50);
        assert!(!score.passed);
    }

    #[test]
    fn no_questions_scores_zero_without_dividing() {
        let score = score_quiz(&[], &QuizResponses::new(), 80);
        assert_eq!(score.total_points, 0);
        assert_eq!(score.percentage, 0);
        assert!(!score.passed);
    }

    #[test]
    fn zero_passing_score_passes_an_empty_quiz() {
        assert!(score_quiz(&[], &QuizResponses::new(), 0).passed);
    }

    #[test]
    fn passing_score_boundary_passes() {
        let questions = vec![mc(1), mc(1), mc(1), mc(1)];
        let mut responses = QuizResponses::new();
        for q in 0..3 {
            responses.select(q, 0);
        }
        let score = score_quiz(&questions, &responses, 75);
        assert_eq!(score.percentage, 75);
        assert!(score.passed);
    }

    #[test]
    fn free_text_counts_even_when_unanswered() {
        let questions = vec![mc(2), Question::free_text("Explain", 3, 1)];
        let score = score_quiz(&questions, &QuizResponses::new(), 50);
        assert_eq!(score.earned_points, 3);
        assert_eq!(score.total_points, 5);
        assert_eq!(score.percentage, 60);
        assert!(score.passed);
    }

    #[test]
    fn out_of_range_or_text_choice_is_incorrect() {
        let questions = vec![mc(1), mc(1)];
        let mut responses = QuizResponses::new();
        responses.select(0, 9);
        responses.write(1, "right");
        assert_eq!(score_quiz(&questions, &responses, 80).earned_points, 0);
    }

    #[test]
    fn percentage_is_rounded() {
        let questions = vec![mc(1), mc(1), mc(1)];
        let mut responses = QuizResponses::new();
        responses.select(0, 0);
        responses.select(1, 0);
        assert_eq!(score_quiz(&questions, &responses, 80).percentage, 67);
    }

    #[test]
    fn score_is_monotonic_in_correct_answers() {
        let questions: Vec<Question> = (1..=5).map(mc).collect();
        let mut responses = QuizResponses::new();
        for q in 0..questions.len() {
            responses.select(q, 1);
        }

        let mut last = score_quiz(&questions, &responses, 80).percentage;
        for q in 0..questions.len() {
            responses.select(q, 0);
            let next = score_quiz(&questions, &responses, 80).percentage;
            assert!(next >= last, "{next} < {last} after fixing question {q}");
            last = next;
        }
        assert_eq!(last, 100);
    }
}
