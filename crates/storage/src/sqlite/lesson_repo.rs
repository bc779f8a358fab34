use training_core::model::{Lesson, LessonId, SectionId, ValidatedLesson};

use super::SqliteRepository;
use super::mapping::{db, id_to_i64, lesson_id_from_i64, map_lesson_row};
use crate::repository::{LessonRepository, StorageError};

const LESSON_COLUMNS: &str = "id, section_id, title, description, kind, position, duration_minutes, file_ref, metadata, created_at";

#[async_trait::async_trait]
impl LessonRepository for SqliteRepository {
    async fn insert_lesson(
        &self,
        lesson: &ValidatedLesson,
        position: u32,
    ) -> Result<LessonId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO lessons (section_id, title, description, kind, position, duration_minutes, file_ref, metadata, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(id_to_i64("section_id", lesson.section_id.value())?)
        .bind(&lesson.title)
        .bind(&lesson.description)
        .bind(lesson.kind.as_str())
        .bind(i64::from(position))
        .bind(i64::from(lesson.duration_minutes))
        .bind(lesson.file_ref.as_deref())
        .bind(lesson.metadata.as_ref().map(|m| m.to_json()))
        .bind(lesson.created_at)
        .execute(&self.pool)
        .await
        .map_err(db)?;

        lesson_id_from_i64(res.last_insert_rowid())
    }

    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO lessons (id, section_id, title, description, kind, position, duration_minutes, file_ref, metadata, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO UPDATE SET
                section_id = excluded.section_id,
                title = excluded.title,
                description = excluded.description,
                kind = excluded.kind,
                position = excluded.position,
                duration_minutes = excluded.duration_minutes,
                file_ref = excluded.file_ref,
                metadata = excluded.metadata
            ",
        )
        .bind(id_to_i64("lesson_id", lesson.id().value())?)
        .bind(id_to_i64("section_id", lesson.section_id().value())?)
        .bind(lesson.title())
        .bind(lesson.description())
        .bind(lesson.kind().as_str())
        .bind(i64::from(lesson.position()))
        .bind(i64::from(lesson.duration_minutes()))
        .bind(lesson.file_ref())
        .bind(lesson.metadata().map(|m| m.to_json()))
        .bind(lesson.created_at())
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(())
    }

    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError> {
        let sql = format!("SELECT {LESSON_COLUMNS} FROM lessons WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id_to_i64("lesson_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(db)?;

        row.as_ref().map(map_lesson_row).transpose()
    }

    async fn list_lessons(&self, section_id: SectionId) -> Result<Vec<Lesson>, StorageError> {
        let sql = format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE section_id = ?1 ORDER BY position ASC, id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(id_to_i64("section_id", section_id.value())?)
            .fetch_all(&self.pool)
            .await
            .map_err(db)?;

        let mut lessons = Vec::with_capacity(rows.len());
        for row in &rows {
            lessons.push(map_lesson_row(row)?);
        }
        Ok(lessons)
    }

    async fn delete_lesson(&self, id: LessonId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM lessons WHERE id = ?1")
            .bind(id_to_i64("lesson_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(db)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
