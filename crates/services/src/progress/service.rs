use std::sync::Arc;

use storage::repository::ProgressRepository;
use training_core::model::{FormationId, Lesson, ProgressKey, ProgressRecord, UserId};
use training_core::progress::{
    ProgressDefaults, ProgressTracker, ProgressUnit, ResolvedTotal, resolve_total,
};

use crate::Clock;
use crate::error::ProgressServiceError;

/// What a lesson viewer needs to start tracking.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonProgress {
    pub key: ProgressKey,
    pub total: ResolvedTotal,
    pub tracker: ProgressTracker,
    pub previous: Option<ProgressRecord>,
}

/// Resolves lesson totals and persists tracker snapshots as progress records.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    progress: Arc<dyn ProgressRepository>,
    defaults: ProgressDefaults,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, progress: Arc<dyn ProgressRepository>) -> Self {
        Self {
            clock,
            progress,
            defaults: ProgressDefaults::default(),
        }
    }

    #[must_use]
    pub fn with_defaults(mut self, defaults: ProgressDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    #[must_use]
    pub fn defaults(&self) -> ProgressDefaults {
        self.defaults
    }

    /// Build a tracker for `lesson`, resuming from the learner's last position
    /// and time spent.
    ///
    /// `media_duration_secs` is the loaded video's duration when known.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the previous record cannot be read.
    pub async fn open_lesson(
        &self,
        lesson: &Lesson,
        formation_id: FormationId,
        user_id: UserId,
        media_duration_secs: Option<f64>,
    ) -> Result<LessonProgress, ProgressServiceError> {
        let key = ProgressKey::new(lesson.id(), formation_id, user_id);
        let total = resolve_total(lesson, &self.defaults, media_duration_secs);
        if total.is_placeholder() {
            tracing::debug!(
                lesson_id = lesson.id().value(),
                units = total.units,
                "lesson total unknown, using placeholder"
            );
        }

        let mut tracker = ProgressTracker::for_total(total)?;
        let previous = self.progress.get_progress(key).await?;
        if let Some(record) = &previous {
            tracker.resume_time(record.time_spent_secs());
            let markers = record.markers();
            let resume = match total.unit {
                ProgressUnit::Page => markers.page.map(f64::from),
                ProgressUnit::Slide => markers.slide.map(f64::from),
                ProgressUnit::Second => markers.time_offset_secs,
                ProgressUnit::Step => None,
            };
            if let Some(position) = resume {
                tracker.set_position(position)?;
            }
        }

        Ok(LessonProgress {
            key,
            total,
            tracker,
            previous,
        })
    }

    /// Fold the tracker's current state into the stored record and upsert it.
    ///
    /// The first call for a key creates the record.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the record cannot be read or written.
    pub async fn record_snapshot(
        &self,
        key: ProgressKey,
        tracker: &ProgressTracker,
    ) -> Result<ProgressRecord, ProgressServiceError> {
        let now = self.clock.now();
        let mut record = self
            .progress
            .get_progress(key)
            .await?
            .unwrap_or_else(|| ProgressRecord::first_view(key, now));
        let was_completed = record.is_completed();

        record.apply_snapshot(&tracker.snapshot(), tracker.markers(), now);
        self.progress.upsert_progress(&record).await?;

        if record.is_completed() && !was_completed {
            tracing::info!(
                lesson_id = key.lesson_id.value(),
                user_id = key.user_id.value(),
                time_spent_secs = record.time_spent_secs(),
                "lesson completed"
            );
        } else {
            tracing::debug!(
                lesson_id = key.lesson_id.value(),
                progress = record.progress(),
                "progress recorded"
            );
        }
        Ok(record)
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if repository access fails.
    pub async fn load(&self, key: ProgressKey) -> Result<Option<ProgressRecord>, ProgressServiceError> {
        Ok(self.progress.get_progress(key).await?)
    }

    /// Records of one learner within a formation, ordered by lesson.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if repository access fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        formation_id: FormationId,
    ) -> Result<Vec<ProgressRecord>, ProgressServiceError> {
        Ok(self.progress.list_progress(user_id, formation_id).await?)
    }
}
