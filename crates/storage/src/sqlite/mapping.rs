use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use training_core::model::{
    FormationId, Lesson, LessonId, LessonKind, LessonMetadata, PositionMarkers, ProgressKey,
    ProgressRecord, SectionId, UserId,
};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Map a driver error, surfacing unique-constraint violations as conflicts.
pub(crate) fn db(e: sqlx::Error) -> StorageError {
    match &e {
        sqlx::Error::Database(inner) if inner.is_unique_violation() => StorageError::Conflict,
        _ => StorageError::Connection(e.to_string()),
    }
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn bool_to_i64(value: bool) -> i64 {
    i64::from(value)
}

pub(crate) fn lesson_id_from_i64(v: i64) -> Result<LessonId, StorageError> {
    Ok(LessonId::new(i64_to_u64("lesson_id", v)?))
}

pub(crate) fn map_lesson_row(row: &SqliteRow) -> Result<Lesson, StorageError> {
    let kind_str: String = row.try_get("kind").map_err(ser)?;
    let kind = LessonKind::parse(&kind_str).map_err(ser)?;
    let metadata = row
        .try_get::<Option<String>, _>("metadata")
        .map_err(ser)?
        .map(|json| LessonMetadata::parse(&json))
        .transpose()
        .map_err(ser)?;

    Lesson::from_persisted(
        lesson_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        SectionId::new(i64_to_u64(
            "section_id",
            row.try_get::<i64, _>("section_id").map_err(ser)?,
        )?),
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get::<String, _>("description").map_err(ser)?,
        kind,
        u32_from_i64("position", row.try_get::<i64, _>("position").map_err(ser)?)?,
        u32_from_i64(
            "duration_minutes",
            row.try_get::<i64, _>("duration_minutes").map_err(ser)?,
        )?,
        row.try_get::<Option<String>, _>("file_ref").map_err(ser)?,
        metadata,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<ProgressRecord, StorageError> {
    let key = ProgressKey::new(
        lesson_id_from_i64(row.try_get::<i64, _>("lesson_id").map_err(ser)?)?,
        FormationId::new(i64_to_u64(
            "formation_id",
            row.try_get::<i64, _>("formation_id").map_err(ser)?,
        )?),
        UserId::new(i64_to_u64(
            "user_id",
            row.try_get::<i64, _>("user_id").map_err(ser)?,
        )?),
    );
    let markers = PositionMarkers {
        page: row
            .try_get::<Option<i64>, _>("current_page")
            .map_err(ser)?
            .map(|v| u32_from_i64("current_page", v))
            .transpose()?,
        slide: row
            .try_get::<Option<i64>, _>("current_slide")
            .map_err(ser)?
            .map(|v| u32_from_i64("current_slide", v))
            .transpose()?,
        time_offset_secs: row.try_get("time_offset_secs").map_err(ser)?,
    };

    ProgressRecord::from_persisted(
        key,
        i64_to_u64(
            "time_spent_secs",
            row.try_get::<i64, _>("time_spent_secs").map_err(ser)?,
        )?,
        row.try_get("progress").map_err(ser)?,
        row.try_get::<i64, _>("completed").map_err(ser)? != 0,
        markers,
        row.try_get("updated_at").map_err(ser)?,
    )
    .map_err(ser)
}
