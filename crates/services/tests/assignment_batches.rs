use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use services::{AssignmentService, AssignmentServiceError, Clock};
use storage::repository::{AssignmentRepository, StorageError};
use training_core::model::{Assignee, Assignment, AssignmentDraft, FormationId, UserId};
use training_core::time::fixed_now;

/// Accepts a fixed number of writes, then reports a lost connection.
struct FlakyAssignments {
    remaining: Mutex<usize>,
    stored: Mutex<Vec<Assignment>>,
}

#[async_trait]
impl AssignmentRepository for FlakyAssignments {
    async fn insert_assignment(&self, assignment: &Assignment) -> Result<(), StorageError> {
        let mut remaining = self.remaining.lock().unwrap();
        if *remaining == 0 {
            return Err(StorageError::Connection("connection reset".into()));
        }
        *remaining -= 1;
        self.stored.lock().unwrap().push(assignment.clone());
        Ok(())
    }

    async fn list_assignments(
        &self,
        formation_id: FormationId,
    ) -> Result<Vec<Assignment>, StorageError> {
        Ok(self
            .stored
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.formation_id == formation_id)
            .cloned()
            .collect())
    }
}

#[tokio::test]
async fn batch_is_sequential_without_rollback() {
    let repo = Arc::new(FlakyAssignments {
        remaining: Mutex::new(2),
        stored: Mutex::new(Vec::new()),
    });
    let svc = AssignmentService::new(Clock::fixed(fixed_now()), repo.clone());

    let mut draft = AssignmentDraft::new(FormationId::new(1));
    draft.users = vec![UserId::new(4), UserId::new(2), UserId::new(3), UserId::new(1)];

    let err = svc.assign(draft).await.unwrap_err();
    match err {
        AssignmentServiceError::Partial { applied, total, .. } => {
            assert_eq!((applied, total), (2, 4));
        }
        other => panic!("expected partial failure, got {other:?}"),
    }

    let stored: Vec<_> = svc
        .list(FormationId::new(1))
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.assignee)
        .collect();
    assert_eq!(
        stored,
        vec![Assignee::User(UserId::new(1)), Assignee::User(UserId::new(2))]
    );
}
