use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs versioned migrations for the current schema.
///
/// Version 1 creates lessons, progress records, quizzes (with questions and
/// answers) and assignments.
#[allow(clippy::too_many_lines)]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if is_applied(pool, 1).await? {
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS lessons (
                id INTEGER PRIMARY KEY,
                section_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                kind TEXT NOT NULL
                    CHECK (kind IN ('video', 'document', 'presentation', 'interactive')),
                position INTEGER NOT NULL CHECK (position >= 0),
                duration_minutes INTEGER NOT NULL CHECK (duration_minutes >= 0),
                file_ref TEXT,
                metadata TEXT,
                created_at TEXT NOT NULL
            );
        ",
    )
    .execute(&mut *tx)
    .await?;

    // No foreign key to lessons: progress is kept as history after a lesson is deleted.
    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS progress_records (
                lesson_id INTEGER NOT NULL,
                formation_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                time_spent_secs INTEGER NOT NULL CHECK (time_spent_secs >= 0),
                progress REAL NOT NULL CHECK (progress BETWEEN 0 AND 100),
                completed INTEGER NOT NULL CHECK (completed IN (0, 1)),
                current_page INTEGER,
                current_slide INTEGER,
                time_offset_secs REAL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (lesson_id, formation_id, user_id)
            );
        ",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS quizzes (
                id INTEGER PRIMARY KEY,
                lesson_id INTEGER,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                passing_score INTEGER NOT NULL CHECK (passing_score BETWEEN 0 AND 100),
                time_limit_minutes INTEGER CHECK (time_limit_minutes > 0),
                is_active INTEGER NOT NULL CHECK (is_active IN (0, 1))
            );
        ",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS quiz_questions (
                id INTEGER PRIMARY KEY,
                quiz_id INTEGER NOT NULL,
                position INTEGER NOT NULL CHECK (position >= 0),
                text TEXT NOT NULL,
                kind TEXT NOT NULL CHECK (kind IN ('multiple_choice', 'free_text')),
                points INTEGER NOT NULL CHECK (points > 0),
                FOREIGN KEY (quiz_id) REFERENCES quizzes(id) ON DELETE CASCADE
            );
        ",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS quiz_answers (
                id INTEGER PRIMARY KEY,
                question_id INTEGER NOT NULL,
                position INTEGER NOT NULL CHECK (position >= 0),
                text TEXT NOT NULL,
                is_correct INTEGER NOT NULL CHECK (is_correct IN (0, 1)),
                FOREIGN KEY (question_id) REFERENCES quiz_questions(id) ON DELETE CASCADE
            );
        ",
    )
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS assignments (
                id INTEGER PRIMARY KEY,
                formation_id INTEGER NOT NULL,
                user_id INTEGER,
                group_id INTEGER,
                assigned_at TEXT NOT NULL,
                due_at TEXT,
                CHECK ((user_id IS NULL) <> (group_id IS NULL))
            );
        ",
    )
    .execute(&mut *tx)
    .await?;

    for index in [
        r"
            CREATE INDEX IF NOT EXISTS idx_lessons_section_position
                ON lessons (section_id, position, id);
        ",
        r"
            CREATE INDEX IF NOT EXISTS idx_progress_user_formation
                ON progress_records (user_id, formation_id);
        ",
        r"
            CREATE INDEX IF NOT EXISTS idx_quizzes_lesson
                ON quizzes (lesson_id);
        ",
        r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_assignments_formation_user
                ON assignments (formation_id, user_id) WHERE user_id IS NOT NULL;
        ",
        r"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_assignments_formation_group
                ON assignments (formation_id, group_id) WHERE group_id IS NOT NULL;
        ",
    ] {
        sqlx::query(index).execute(&mut *tx).await?;
    }

    sqlx::query(
        r"
            INSERT INTO schema_migrations (version, applied_at)
            VALUES (?1, ?2)
            ON CONFLICT(version) DO NOTHING
        ",
    )
    .bind(1_i64)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    tracing::info!(version = 1, "applied schema migration");

    Ok(())
}
