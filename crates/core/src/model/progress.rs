use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{FormationId, LessonId, UserId};
use crate::progress::ProgressSnapshot;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ProgressRecordError {
    #[error("progress must be within 0..=100, got {0}")]
    OutOfRange(f64),
}

/// Where the learner stopped inside a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionMarkers {
    pub page: Option<u32>,
    pub slide: Option<u32>,
    pub time_offset_secs: Option<f64>,
}

/// Identifies a progress record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgressKey {
    pub lesson_id: LessonId,
    pub formation_id: FormationId,
    pub user_id: UserId,
}

impl ProgressKey {
    #[must_use]
    pub fn new(lesson_id: LessonId, formation_id: FormationId, user_id: UserId) -> Self {
        Self {
            lesson_id,
            formation_id,
            user_id,
        }
    }
}

/// Persisted viewing history for one learner on one lesson.
///
/// Records are kept as history: once completed they stay completed and
/// time spent never goes down.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRecord {
    key: ProgressKey,
    time_spent_secs: u64,
    progress: f64,
    completed: bool,
    markers: PositionMarkers,
    updated_at: DateTime<Utc>,
}

impl ProgressRecord {
    /// Fresh record created on first view.
    #[must_use]
    pub fn first_view(key: ProgressKey, now: DateTime<Utc>) -> Self {
        Self {
            key,
            time_spent_secs: 0,
            progress: 0.0,
            completed: false,
            markers: PositionMarkers::default(),
            updated_at: now,
        }
    }

    /// # Errors
    ///
    /// Returns `ProgressRecordError::OutOfRange` when the stored percentage is not in 0..=100.
    pub fn from_persisted(
        key: ProgressKey,
        time_spent_secs: u64,
        progress: f64,
        completed: bool,
        markers: PositionMarkers,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, ProgressRecordError> {
        if !progress.is_finite() || !(0.0..=100.0).contains(&progress) {
            return Err(ProgressRecordError::OutOfRange(progress));
        }
        Ok(Self {
            key,
            time_spent_secs,
            progress,
            completed,
            markers,
            updated_at,
        })
    }

    /// Fold a tracker snapshot into the record.
    pub fn apply_snapshot(
        &mut self,
        snapshot: &ProgressSnapshot,
        markers: PositionMarkers,
        now: DateTime<Utc>,
    ) {
        self.time_spent_secs = self.time_spent_secs.max(snapshot.time_spent_secs);
        self.progress = snapshot.progress.clamp(0.0, 100.0);
        self.completed = self.completed || snapshot.completed;
        self.markers = markers;
        self.updated_at = now;
    }

    #[must_use]
    pub fn key(&self) -> ProgressKey {
        self.key
    }

    #[must_use]
    pub fn time_spent_secs(&self) -> u64 {
        self.time_spent_secs
    }

    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn markers(&self) -> PositionMarkers {
        self.markers
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn key() -> ProgressKey {
        ProgressKey::new(LessonId::new(1), FormationId::new(2), UserId::new(3))
    }

    fn snapshot(time: u64, progress: f64) -> ProgressSnapshot {
        ProgressSnapshot {
            time_spent_secs: time,
            progress,
            completed: progress >= 90.0,
        }
    }

    #[test]
    fn completion_is_sticky() {
        let mut record = ProgressRecord::first_view(key(), fixed_now());
        record.apply_snapshot(&snapshot(30, 95.0), PositionMarkers::default(), fixed_now());
        assert!(record.is_completed());

        record.apply_snapshot(&snapshot(40, 20.0), PositionMarkers::default(), fixed_now());
        assert!(record.is_completed());
        assert_eq!(record.progress(), 20.0);
    }

    #[test]
    fn time_spent_never_decreases() {
        let mut record = ProgressRecord::first_view(key(), fixed_now());
        record.apply_snapshot(&snapshot(120, 10.0), PositionMarkers::default(), fixed_now());
        record.apply_snapshot(&snapshot(5, 12.0), PositionMarkers::default(), fixed_now());
        assert_eq!(record.time_spent_secs(), 120);
    }

    #[test]
    fn persisted_progress_must_be_a_percentage() {
        let err = ProgressRecord::from_persisted(
            key(),
            0,
            140.0,
            false,
            PositionMarkers::default(),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, ProgressRecordError::OutOfRange(140.0));
    }
}
