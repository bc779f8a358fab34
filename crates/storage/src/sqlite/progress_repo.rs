use training_core::model::{FormationId, ProgressKey, ProgressRecord, UserId};

use super::SqliteRepository;
use super::mapping::{bool_to_i64, db, id_to_i64, map_progress_row};
use crate::repository::{ProgressRepository, StorageError};

const PROGRESS_COLUMNS: &str = "lesson_id, formation_id, user_id, time_spent_secs, progress, completed, current_page, current_slide, time_offset_secs, updated_at";

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn get_progress(&self, key: ProgressKey) -> Result<Option<ProgressRecord>, StorageError> {
        let sql = format!(
            "SELECT {PROGRESS_COLUMNS} FROM progress_records WHERE lesson_id = ?1 AND formation_id = ?2 AND user_id = ?3"
        );
        let row = sqlx::query(&sql)
            .bind(id_to_i64("lesson_id", key.lesson_id.value())?)
            .bind(id_to_i64("formation_id", key.formation_id.value())?)
            .bind(id_to_i64("user_id", key.user_id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(db)?;

        row.as_ref().map(map_progress_row).transpose()
    }

    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let key = record.key();
        let markers = record.markers();
        let time_spent = i64::try_from(record.time_spent_secs())
            .map_err(|_| StorageError::Serialization("time_spent_secs overflow".into()))?;

        sqlx::query(
            r"
            INSERT INTO progress_records (
                lesson_id, formation_id, user_id, time_spent_secs, progress, completed,
                current_page, current_slide, time_offset_secs, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(lesson_id, formation_id, user_id) DO UPDATE SET
                time_spent_secs = excluded.time_spent_secs,
                progress = excluded.progress,
                completed = excluded.completed,
                current_page = excluded.current_page,
                current_slide = excluded.current_slide,
                time_offset_secs = excluded.time_offset_secs,
                updated_at = excluded.updated_at
            ",
        )
        .bind(id_to_i64("lesson_id", key.lesson_id.value())?)
        .bind(id_to_i64("formation_id", key.formation_id.value())?)
        .bind(id_to_i64("user_id", key.user_id.value())?)
        .bind(time_spent)
        .bind(record.progress())
        .bind(bool_to_i64(record.is_completed()))
        .bind(markers.page.map(i64::from))
        .bind(markers.slide.map(i64::from))
        .bind(markers.time_offset_secs)
        .bind(record.updated_at())
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(())
    }

    async fn list_progress(
        &self,
        user_id: UserId,
        formation_id: FormationId,
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let sql = format!(
            "SELECT {PROGRESS_COLUMNS} FROM progress_records WHERE user_id = ?1 AND formation_id = ?2 ORDER BY lesson_id ASC"
        );
        let rows = sqlx::query(&sql)
            .bind(id_to_i64("user_id", user_id.value())?)
            .bind(id_to_i64("formation_id", formation_id.value())?)
            .fetch_all(&self.pool)
            .await
            .map_err(db)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(map_progress_row(row)?);
        }
        Ok(out)
    }
}
