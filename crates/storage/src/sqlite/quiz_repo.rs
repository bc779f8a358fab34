use std::collections::HashMap;

use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use training_core::model::{
    Answer, LessonId, Question, QuestionKind, Quiz, QuizId, QuizSettings,
};

use super::SqliteRepository;
use super::mapping::{
    bool_to_i64, db, i64_to_u64, id_to_i64, lesson_id_from_i64, ser, u32_from_i64,
};
use crate::repository::{QuizRepository, StorageError};

impl SqliteRepository {
    async fn load_quiz(&self, row: &SqliteRow) -> Result<Quiz, StorageError> {
        let id: i64 = row.try_get("id").map_err(ser)?;

        let answer_rows = sqlx::query(
            r"
            SELECT a.question_id, a.position, a.text, a.is_correct
            FROM quiz_answers a
            JOIN quiz_questions q ON q.id = a.question_id
            WHERE q.quiz_id = ?1
            ORDER BY a.question_id ASC, a.position ASC
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        let mut answers: HashMap<i64, Vec<Answer>> = HashMap::new();
        for a in &answer_rows {
            let question_id: i64 = a.try_get("question_id").map_err(ser)?;
            answers.entry(question_id).or_default().push(Answer::new(
                a.try_get::<String, _>("text").map_err(ser)?,
                a.try_get::<i64, _>("is_correct").map_err(ser)? != 0,
                u32_from_i64("answer position", a.try_get::<i64, _>("position").map_err(ser)?)?,
            ));
        }

        let question_rows = sqlx::query(
            r"
            SELECT id, position, text, kind, points
            FROM quiz_questions
            WHERE quiz_id = ?1
            ORDER BY position ASC, id ASC
            ",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        let mut questions = Vec::with_capacity(question_rows.len());
        for q in &question_rows {
            let question_id: i64 = q.try_get("id").map_err(ser)?;
            let kind = QuestionKind::parse(&q.try_get::<String, _>("kind").map_err(ser)?)
                .map_err(ser)?;
            questions.push(Question {
                text: q.try_get("text").map_err(ser)?,
                kind,
                points: u32_from_i64("points", q.try_get::<i64, _>("points").map_err(ser)?)?,
                position: u32_from_i64(
                    "question position",
                    q.try_get::<i64, _>("position").map_err(ser)?,
                )?,
                answers: answers.remove(&question_id).unwrap_or_default(),
            });
        }

        let passing_score = u8::try_from(row.try_get::<i64, _>("passing_score").map_err(ser)?)
            .map_err(ser)?;
        let time_limit = row
            .try_get::<Option<i64>, _>("time_limit_minutes")
            .map_err(ser)?
            .map(|v| u32_from_i64("time_limit_minutes", v))
            .transpose()?;
        let settings = QuizSettings::new(
            passing_score,
            time_limit,
            row.try_get::<i64, _>("is_active").map_err(ser)? != 0,
        )
        .map_err(ser)?;

        Quiz::new(
            QuizId::new(i64_to_u64("quiz_id", id)?),
            row.try_get::<Option<i64>, _>("lesson_id")
                .map_err(ser)?
                .map(lesson_id_from_i64)
                .transpose()?,
            row.try_get::<String, _>("title").map_err(ser)?,
            row.try_get::<String, _>("description").map_err(ser)?,
            settings,
            questions,
        )
        .map_err(ser)
    }
}

#[async_trait::async_trait]
impl QuizRepository for SqliteRepository {
    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        let quiz_id = id_to_i64("quiz_id", quiz.id().value())?;
        let lesson_id = quiz
            .lesson_id()
            .map(|l| id_to_i64("lesson_id", l.value()))
            .transpose()?;
        let settings = quiz.settings();

        let mut tx = self.pool.begin().await.map_err(db)?;

        sqlx::query(
            r"
            INSERT INTO quizzes (id, lesson_id, title, description, passing_score, time_limit_minutes, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                lesson_id = excluded.lesson_id,
                title = excluded.title,
                description = excluded.description,
                passing_score = excluded.passing_score,
                time_limit_minutes = excluded.time_limit_minutes,
                is_active = excluded.is_active
            ",
        )
        .bind(quiz_id)
        .bind(lesson_id)
        .bind(quiz.title())
        .bind(quiz.description())
        .bind(i64::from(settings.passing_score()))
        .bind(settings.time_limit_minutes().map(i64::from))
        .bind(bool_to_i64(settings.is_active()))
        .execute(&mut *tx)
        .await
        .map_err(db)?;

        // Answers go with their questions via ON DELETE CASCADE.
        sqlx::query("DELETE FROM quiz_questions WHERE quiz_id = ?1")
            .bind(quiz_id)
            .execute(&mut *tx)
            .await
            .map_err(db)?;

        for question in quiz.questions() {
            let res = sqlx::query(
                r"
                INSERT INTO quiz_questions (quiz_id, position, text, kind, points)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ",
            )
            .bind(quiz_id)
            .bind(i64::from(question.position))
            .bind(&question.text)
            .bind(question.kind.as_str())
            .bind(i64::from(question.points))
            .execute(&mut *tx)
            .await
            .map_err(db)?;
            let question_id = res.last_insert_rowid();

            for answer in &question.answers {
                sqlx::query(
                    r"
                    INSERT INTO quiz_answers (question_id, position, text, is_correct)
                    VALUES (?1, ?2, ?3, ?4)
                    ",
                )
                .bind(question_id)
                .bind(i64::from(answer.position))
                .bind(&answer.text)
                .bind(bool_to_i64(answer.is_correct))
                .execute(&mut *tx)
                .await
                .map_err(db)?;
            }
        }

        tx.commit().await.map_err(db)?;
        Ok(())
    }

    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, lesson_id, title, description, passing_score, time_limit_minutes, is_active
            FROM quizzes WHERE id = ?1
            ",
        )
        .bind(id_to_i64("quiz_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?;

        match row {
            Some(row) => self.load_quiz(&row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn find_quiz_for_lesson(
        &self,
        lesson_id: LessonId,
    ) -> Result<Option<Quiz>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, lesson_id, title, description, passing_score, time_limit_minutes, is_active
            FROM quizzes WHERE lesson_id = ?1
            ORDER BY id ASC
            LIMIT 1
            ",
        )
        .bind(id_to_i64("lesson_id", lesson_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db)?;

        match row {
            Some(row) => self.load_quiz(&row).await.map(Some),
            None => Ok(None),
        }
    }
}
