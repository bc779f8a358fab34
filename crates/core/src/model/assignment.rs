use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{FormationId, GroupId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AssignmentError {
    #[error("select at least one collaborator")]
    NoUsersSelected,

    #[error("select a group to assign the formation to")]
    NoGroupSelected,

    #[error("due date must be after the assignment date")]
    DueBeforeAssigned,
}

/// Who the assignment form targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetMode {
    #[default]
    Users,
    Group,
}

/// Unvalidated assignment form state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentDraft {
    pub formation_id: FormationId,
    pub mode: TargetMode,
    pub users: Vec<UserId>,
    pub group: Option<GroupId>,
    pub due_at: Option<DateTime<Utc>>,
}

impl AssignmentDraft {
    #[must_use]
    pub fn new(formation_id: FormationId) -> Self {
        Self {
            formation_id,
            mode: TargetMode::Users,
            users: Vec::new(),
            group: None,
            due_at: None,
        }
    }

    /// # Errors
    ///
    /// Returns `AssignmentError` when the selected target is empty or the due date is in the past.
    pub fn validate(self, now: DateTime<Utc>) -> Result<AssignmentPlan, AssignmentError> {
        let target = match self.mode {
            TargetMode::Users => {
                let mut users = self.users;
                users.sort_unstable();
                users.dedup();
                if users.is_empty() {
                    return Err(AssignmentError::NoUsersSelected);
                }
                AssignmentTarget::Users(users)
            }
            TargetMode::Group => {
                AssignmentTarget::Group(self.group.ok_or(AssignmentError::NoGroupSelected)?)
            }
        };
        if self.due_at.is_some_and(|due| due <= now) {
            return Err(AssignmentError::DueBeforeAssigned);
        }
        Ok(AssignmentPlan {
            formation_id: self.formation_id,
            target,
            assigned_at: now,
            due_at: self.due_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentTarget {
    Users(Vec<UserId>),
    Group(GroupId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Assignee {
    User(UserId),
    Group(GroupId),
}

/// Validated assignment request, expanded into one `Assignment` per assignee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentPlan {
    pub formation_id: FormationId,
    pub target: AssignmentTarget,
    pub assigned_at: DateTime<Utc>,
    pub due_at: Option<DateTime<Utc>>,
}

impl AssignmentPlan {
    #[must_use]
    pub fn assignments(&self) -> Vec<Assignment> {
        let assignees: Vec<Assignee> = match &self.target {
            AssignmentTarget::Users(users) => users.iter().copied().map(Assignee::User).collect(),
            AssignmentTarget::Group(group) => vec![Assignee::Group(*group)],
        };
        assignees
            .into_iter()
            .map(|assignee| Assignment {
                formation_id: self.formation_id,
                assignee,
                assigned_at: self.assigned_at,
                due_at: self.due_at,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub formation_id: FormationId,
    pub assignee: Assignee,
    pub assigned_at: DateTime<Utc>,
    pub due_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn user_mode_requires_selection() {
        let err = AssignmentDraft::new(FormationId::new(1))
            .validate(fixed_now())
            .unwrap_err();
        assert_eq!(err, AssignmentError::NoUsersSelected);
    }

    #[test]
    fn group_mode_requires_group() {
        let mut draft = AssignmentDraft::new(FormationId::new(1));
        draft.mode = TargetMode::Group;
        draft.users = vec![UserId::new(1)];
        assert_eq!(
            draft.validate(fixed_now()).unwrap_err(),
            AssignmentError::NoGroupSelected
        );
    }

    #[test]
    fn users_are_deduplicated_into_assignments() {
        let mut draft = AssignmentDraft::new(FormationId::new(4));
        draft.users = vec![UserId::new(2), UserId::new(1), UserId::new(2)];
        let plan = draft.validate(fixed_now()).unwrap();
        let assignees: Vec<_> = plan.assignments().into_iter().map(|a| a.assignee).collect();
        assert_eq!(
            assignees,
            vec![Assignee::User(UserId::new(1)), Assignee::User(UserId::new(2))]
        );
    }

    #[test]
    fn past_due_date_is_rejected() {
        let mut draft = AssignmentDraft::new(FormationId::new(4));
        draft.users = vec![UserId::new(1)];
        draft.due_at = Some(fixed_now() - Duration::days(1));
        assert_eq!(
            draft.validate(fixed_now()).unwrap_err(),
            AssignmentError::DueBeforeAssigned
        );
    }
}
