use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use training_core::model::{Assignee, Assignment, FormationId, GroupId, UserId};

use super::SqliteRepository;
use super::mapping::{db, i64_to_u64, id_to_i64, ser};
use crate::repository::{AssignmentRepository, StorageError};

fn map_assignment_row(row: &SqliteRow) -> Result<Assignment, StorageError> {
    let user_id: Option<i64> = row.try_get("user_id").map_err(ser)?;
    let group_id: Option<i64> = row.try_get("group_id").map_err(ser)?;
    let assignee = match (user_id, group_id) {
        (Some(user), None) => Assignee::User(UserId::new(i64_to_u64("user_id", user)?)),
        (None, Some(group)) => Assignee::Group(GroupId::new(i64_to_u64("group_id", group)?)),
        _ => {
            return Err(StorageError::Serialization(
                "assignment must target exactly one user or group".into(),
            ));
        }
    };

    Ok(Assignment {
        formation_id: FormationId::new(i64_to_u64(
            "formation_id",
            row.try_get::<i64, _>("formation_id").map_err(ser)?,
        )?),
        assignee,
        assigned_at: row.try_get("assigned_at").map_err(ser)?,
        due_at: row.try_get("due_at").map_err(ser)?,
    })
}

#[async_trait::async_trait]
impl AssignmentRepository for SqliteRepository {
    async fn insert_assignment(&self, assignment: &Assignment) -> Result<(), StorageError> {
        let (user_id, group_id) = match assignment.assignee {
            Assignee::User(id) => (Some(id_to_i64("user_id", id.value())?), None),
            Assignee::Group(id) => (None, Some(id_to_i64("group_id", id.value())?)),
        };

        sqlx::query(
            r"
            INSERT INTO assignments (formation_id, user_id, group_id, assigned_at, due_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(id_to_i64("formation_id", assignment.formation_id.value())?)
        .bind(user_id)
        .bind(group_id)
        .bind(assignment.assigned_at)
        .bind(assignment.due_at)
        .execute(&self.pool)
        .await
        .map_err(db)?;

        Ok(())
    }

    async fn list_assignments(
        &self,
        formation_id: FormationId,
    ) -> Result<Vec<Assignment>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT formation_id, user_id, group_id, assigned_at, due_at
            FROM assignments
            WHERE formation_id = ?1
            ORDER BY user_id IS NULL, user_id ASC, group_id ASC
            ",
        )
        .bind(id_to_i64("formation_id", formation_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(db)?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            out.push(map_assignment_row(row)?);
        }
        Ok(out)
    }
}
