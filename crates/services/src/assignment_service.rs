use std::sync::Arc;

use storage::repository::AssignmentRepository;
use training_core::model::{Assignment, AssignmentDraft, FormationId};

use crate::Clock;
use crate::error::AssignmentServiceError;

/// Outcome of an assignment batch that ran to the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentReport {
    pub applied: usize,
}

/// Assigns formations to learners or groups.
#[derive(Clone)]
pub struct AssignmentService {
    clock: Clock,
    assignments: Arc<dyn AssignmentRepository>,
}

impl AssignmentService {
    #[must_use]
    pub fn new(clock: Clock, assignments: Arc<dyn AssignmentRepository>) -> Self {
        Self { clock, assignments }
    }

    /// Validate the form and store one assignment per target, in order.
    ///
    /// Requests are issued one at a time. There is no rollback: when a write
    /// fails the earlier ones stay applied and the error carries their count.
    ///
    /// # Errors
    ///
    /// Returns `AssignmentServiceError::Assignment` when the form is invalid (nothing is written).
    /// Returns `AssignmentServiceError::Partial` when a write fails.
    pub async fn assign(
        &self,
        draft: AssignmentDraft,
    ) -> Result<AssignmentReport, AssignmentServiceError> {
        let plan = draft.validate(self.clock.now())?;
        let batch = plan.assignments();
        let total = batch.len();

        for (applied, assignment) in batch.iter().enumerate() {
            if let Err(source) = self.assignments.insert_assignment(assignment).await {
                tracing::warn!(
                    formation_id = plan.formation_id.value(),
                    applied,
                    total,
                    error = %source,
                    "assignment batch stopped partway"
                );
                return Err(AssignmentServiceError::Partial {
                    applied,
                    total,
                    source,
                });
            }
        }

        tracing::info!(
            formation_id = plan.formation_id.value(),
            applied = total,
            "formation assigned"
        );
        Ok(AssignmentReport { applied: total })
    }

    /// # Errors
    ///
    /// Returns `AssignmentServiceError::Storage` if repository access fails.
    pub async fn list(
        &self,
        formation_id: FormationId,
    ) -> Result<Vec<Assignment>, AssignmentServiceError> {
        Ok(self.assignments.list_assignments(formation_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use storage::repository::{InMemoryRepository, StorageError};
    use training_core::model::{AssignmentError, GroupId, TargetMode, UserId};
    use training_core::time::{fixed_clock, fixed_now};

    fn service(repo: &InMemoryRepository) -> AssignmentService {
        AssignmentService::new(fixed_clock(), Arc::new(repo.clone()))
    }

    fn users(formation: u64, ids: &[u64]) -> AssignmentDraft {
        let mut draft = AssignmentDraft::new(FormationId::new(formation));
        draft.users = ids.iter().copied().map(UserId::new).collect();
        draft
    }

    #[tokio::test]
    async fn assigns_every_selected_user() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let report = svc.assign(users(1, &[3, 1, 2])).await.unwrap();
        assert_eq!(report.applied, 3);
        assert_eq!(svc.list(FormationId::new(1)).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn empty_selection_blocks_submission() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let err = svc.assign(users(1, &[])).await.unwrap_err();
        assert!(matches!(
            err,
            AssignmentServiceError::Assignment(AssignmentError::NoUsersSelected)
        ));

        let mut group = AssignmentDraft::new(FormationId::new(1));
        group.mode = TargetMode::Group;
        assert!(matches!(
            svc.assign(group).await,
            Err(AssignmentServiceError::Assignment(AssignmentError::NoGroupSelected))
        ));
        assert!(svc.list(FormationId::new(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failure_partway_keeps_earlier_assignments() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        svc.assign(users(1, &[2])).await.unwrap();

        let err = svc.assign(users(1, &[1, 2, 3])).await.unwrap_err();
        match err {
            AssignmentServiceError::Partial {
                applied,
                total,
                source,
            } => {
                assert_eq!(applied, 1);
                assert_eq!(total, 3);
                assert!(matches!(source, StorageError::Conflict));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(svc.list(FormationId::new(1)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn group_with_due_date_is_stored() {
        let repo = InMemoryRepository::new();
        let svc = service(&repo);
        let mut draft = AssignmentDraft::new(FormationId::new(2));
        draft.mode = TargetMode::Group;
        draft.group = Some(GroupId::new(7));
        draft.due_at = Some(fixed_now() + Duration::days(14));

        assert_eq!(svc.assign(draft).await.unwrap().applied, 1);
        let stored = svc.list(FormationId::new(2)).await.unwrap();
        assert_eq!(stored[0].due_at, Some(fixed_now() + Duration::days(14)));
    }
}
