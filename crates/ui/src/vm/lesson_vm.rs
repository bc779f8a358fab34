use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use services::{LessonService, ProgressService};
use training_core::model::{
    FormationId, Lesson, LessonId, LessonKind, ProgressKey, ProgressRecord, UserId,
};
use training_core::progress::{
    ProgressError, ProgressSnapshot, ProgressTracker, ProgressUnit, ResolvedTotal,
};

use crate::views::ViewError;
use crate::vm::markdown_vm::markdown_to_html;
use crate::vm::time_fmt::format_clock;

/// Seconds skipped by one "next" / "previous" on a video.
const VIDEO_STEP_SECS: f64 = 10.0;

#[must_use]
pub fn kind_label(kind: LessonKind) -> &'static str {
    match kind {
        LessonKind::Video => "Video",
        LessonKind::Document => "Document",
        LessonKind::Presentation => "Presentation",
        LessonKind::Interactive => "Interactive",
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LessonListItemVm {
    pub id: LessonId,
    pub title: String,
    pub kind: &'static str,
    pub duration_label: Option<String>,
    pub progress_pct: u32,
    pub completed: bool,
}

/// Lessons in display order, joined with the learner's progress records.
#[must_use]
pub fn map_lesson_list(lessons: &[Lesson], progress: &[ProgressRecord]) -> Vec<LessonListItemVm> {
    lessons
        .iter()
        .map(|lesson| {
            let record = progress.iter().find(|r| r.key().lesson_id == lesson.id());
            LessonListItemVm {
                id: lesson.id(),
                title: lesson.title().to_string(),
                kind: kind_label(lesson.kind()),
                duration_label: (lesson.duration_minutes() > 0)
                    .then(|| format!("{} min", lesson.duration_minutes())),
                progress_pct: record.map_or(0, |r| whole_percent(r.progress())),
                completed: record.is_some_and(ProgressRecord::is_completed),
            }
        })
        .collect()
}

#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn whole_percent(progress: f64) -> u32 {
    progress.clamp(0.0, 100.0).floor() as u32
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewerIntent {
    /// First mount or first play.
    Start,
    NextUnit,
    PreviousUnit,
    Seek(f64),
    /// The media reported its real duration.
    MediaLoaded(f64),
    /// Jump to the end (interactive lessons, "mark as done").
    Complete,
    Restart,
}

/// State of an open lesson. The tracker is shared with the progress ticker.
#[derive(Clone, Debug)]
pub struct LessonViewerVm {
    key: ProgressKey,
    title: String,
    kind: LessonKind,
    description_html: String,
    total: ResolvedTotal,
    content_target: Option<String>,
    previously_completed: bool,
    tracker: Arc<Mutex<ProgressTracker>>,
}

impl PartialEq for LessonViewerVm {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && Arc::ptr_eq(&self.tracker, &other.tracker)
    }
}

fn lock(tracker: &Mutex<ProgressTracker>) -> MutexGuard<'_, ProgressTracker> {
    tracker.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LessonViewerVm {
    #[must_use]
    pub fn key(&self) -> ProgressKey {
        self.key
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        kind_label(self.kind)
    }

    #[must_use]
    pub fn description_html(&self) -> &str {
        &self.description_html
    }

    /// URL or attached file the "Open" button hands to the system.
    #[must_use]
    pub fn content_target(&self) -> Option<&str> {
        self.content_target.as_deref()
    }

    #[must_use]
    pub fn previously_completed(&self) -> bool {
        self.previously_completed
    }

    #[must_use]
    pub fn tracker(&self) -> Arc<Mutex<ProgressTracker>> {
        Arc::clone(&self.tracker)
    }

    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        lock(&self.tracker).snapshot()
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        lock(&self.tracker).is_started()
    }

    /// Copy of the tracker, for persisting a snapshot.
    #[must_use]
    pub fn tracker_state(&self) -> ProgressTracker {
        lock(&self.tracker).clone()
    }

    /// Shown when the lesson length is a stand-in value.
    #[must_use]
    pub fn placeholder_note(&self) -> Option<&'static str> {
        self.total.is_placeholder().then_some(match self.total.unit {
            ProgressUnit::Page => "Page count unknown, progress is estimated.",
            ProgressUnit::Slide => "Slide count unknown, progress is estimated.",
            ProgressUnit::Second | ProgressUnit::Step => {
                "Duration unknown, progress is estimated."
            }
        })
    }

    /// Video plays in an external player, so its position only moves
    /// when the learner reports it.
    #[must_use]
    pub fn tracking_note(&self) -> Option<&'static str> {
        (self.total.unit == ProgressUnit::Second).then_some(
            "Video plays outside the app. Move the slider to where you stopped watching.",
        )
    }

    /// Seek slider bounds `(position, total)` in whole seconds, for timed lessons.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn seek_range(&self) -> Option<(u64, u64)> {
        let tracker = lock(&self.tracker);
        (tracker.unit() == ProgressUnit::Second).then(|| {
            (
                tracker.position().round() as u64,
                tracker.total().round() as u64,
            )
        })
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn position_label(&self) -> String {
        let tracker = lock(&self.tracker);
        let position = tracker.position().round() as u64;
        let total = tracker.total().round() as u64;
        match tracker.unit() {
            ProgressUnit::Page => format!("Page {position} of {total}"),
            ProgressUnit::Slide => format!("Slide {position} of {total}"),
            ProgressUnit::Second => format!("{} / {}", format_clock(position), format_clock(total)),
            ProgressUnit::Step => {
                if position >= total {
                    "Done".to_string()
                } else {
                    "Not done yet".to_string()
                }
            }
        }
    }

    /// # Errors
    ///
    /// Returns `ProgressError` for a non-finite seek target or media duration.
    pub fn apply(&self, intent: ViewerIntent) -> Result<(), ProgressError> {
        let mut tracker = lock(&self.tracker);
        let step = match tracker.unit() {
            ProgressUnit::Second => VIDEO_STEP_SECS,
            ProgressUnit::Page | ProgressUnit::Slide | ProgressUnit::Step => 1.0,
        };
        match intent {
            ViewerIntent::Start => {
                tracker.start();
                // The first page or slide is on screen as soon as the viewer opens.
                if matches!(tracker.unit(), ProgressUnit::Page | ProgressUnit::Slide)
                    && tracker.position() < 1.0
                {
                    tracker.set_position(1.0)?;
                }
            }
            ViewerIntent::NextUnit => {
                let next = tracker.position() + step;
                tracker.set_position(next)?;
            }
            ViewerIntent::PreviousUnit => {
                let floor = match tracker.unit() {
                    ProgressUnit::Page | ProgressUnit::Slide => 1.0,
                    ProgressUnit::Second | ProgressUnit::Step => 0.0,
                };
                let previous = (tracker.position() - step).max(floor);
                tracker.set_position(previous)?;
            }
            ViewerIntent::Seek(position) => tracker.set_position(position)?,
            ViewerIntent::MediaLoaded(duration) => tracker.set_total(duration)?,
            ViewerIntent::Complete => {
                let end = tracker.total();
                tracker.set_position(end)?;
            }
            ViewerIntent::Restart => {
                tracker.restart();
                if matches!(tracker.unit(), ProgressUnit::Page | ProgressUnit::Slide) {
                    tracker.set_position(1.0)?;
                }
            }
        }
        Ok(())
    }
}

/// Load a lesson and its stored progress into a viewer.
///
/// # Errors
///
/// Returns `ViewError::NotFound` for an unknown lesson and
/// `ViewError::Unknown` when a service call fails.
pub async fn open_viewer(
    lessons: &LessonService,
    progress: &ProgressService,
    lesson_id: LessonId,
    formation_id: FormationId,
    user_id: UserId,
) -> Result<LessonViewerVm, ViewError> {
    let lesson = lessons
        .get_lesson(lesson_id)
        .await
        .map_err(|_| ViewError::Unknown)?
        .ok_or(ViewError::NotFound)?;
    let opened = progress
        .open_lesson(&lesson, formation_id, user_id, None)
        .await
        .map_err(|_| ViewError::Unknown)?;

    let content_target = lesson.metadata().and_then(|meta| {
        meta.content_url()
            .or_else(|| meta.attached_file())
            .map(str::to_string)
    });
    let content_target = content_target.or_else(|| lesson.file_ref().map(str::to_string));

    Ok(LessonViewerVm {
        key: opened.key,
        title: lesson.title().to_string(),
        kind: lesson.kind(),
        description_html: markdown_to_html(lesson.description()),
        total: opened.total,
        content_target,
        previously_completed: opened
            .previous
            .as_ref()
            .is_some_and(ProgressRecord::is_completed),
        tracker: Arc::new(Mutex::new(opened.tracker)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use services::Clock;
    use storage::repository::InMemoryRepository;
    use training_core::model::{LessonDraft, LessonMetadata, SectionId};
    use training_core::time::fixed_now;

    struct Fixture {
        lessons: LessonService,
        progress: ProgressService,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(InMemoryRepository::new());
        let clock = Clock::fixed(fixed_now());
        Fixture {
            lessons: LessonService::new(clock, repo.clone()),
            progress: ProgressService::new(clock, repo),
        }
    }

    async fn viewer(fx: &Fixture, draft: LessonDraft) -> LessonViewerVm {
        let lesson = fx.lessons.create_lesson(draft).await.unwrap();
        open_viewer(
            &fx.lessons,
            &fx.progress,
            lesson.id(),
            FormationId::new(1),
            UserId::new(1),
        )
        .await
        .unwrap()
    }

    fn section() -> SectionId {
        SectionId::new(1)
    }

    #[tokio::test]
    async fn document_pages_drive_progress() {
        let fx = fixture();
        let meta = LessonMetadata::file("guide.pdf").with_pages(4).unwrap();
        let vm = viewer(
            &fx,
            LessonDraft::new(section(), "Guide", LessonKind::Document).with_metadata(meta),
        )
        .await;

        vm.apply(ViewerIntent::Start).unwrap();
        assert_eq!(vm.position_label(), "Page 1 of 4");
        assert!(vm.placeholder_note().is_none());
        assert_eq!(vm.content_target(), Some("guide.pdf"));

        for _ in 0..5 {
            vm.apply(ViewerIntent::NextUnit).unwrap();
        }
        assert_eq!(vm.position_label(), "Page 4 of 4");
        assert!(vm.snapshot().completed);

        vm.apply(ViewerIntent::PreviousUnit).unwrap();
        let snap = vm.snapshot();
        assert!((snap.progress - 75.0).abs() < 1e-9);
        assert!(!snap.completed);
    }

    #[tokio::test]
    async fn missing_slide_count_is_flagged() {
        let fx = fixture();
        let vm = viewer(
            &fx,
            LessonDraft::new(section(), "Deck", LessonKind::Presentation),
        )
        .await;
        vm.apply(ViewerIntent::Start).unwrap();
        assert_eq!(vm.position_label(), "Slide 1 of 10");
        assert_eq!(
            vm.placeholder_note(),
            Some("Slide count unknown, progress is estimated.")
        );
    }

    #[tokio::test]
    async fn video_uses_loaded_duration() {
        let fx = fixture();
        let vm = viewer(
            &fx,
            LessonDraft::new(section(), "Intro", LessonKind::Video).with_duration(2),
        )
        .await;
        assert_eq!(vm.position_label(), "0:00 / 2:00");

        vm.apply(ViewerIntent::MediaLoaded(50.0)).unwrap();
        vm.apply(ViewerIntent::Seek(45.0)).unwrap();
        assert_eq!(vm.position_label(), "0:45 / 0:50");
        assert!(vm.snapshot().completed);
        assert!(vm.apply(ViewerIntent::Seek(f64::NAN)).is_err());
    }

    #[tokio::test]
    async fn video_position_is_reported_by_the_learner() {
        let fx = fixture();
        let vm = viewer(
            &fx,
            LessonDraft::new(section(), "Intro", LessonKind::Video).with_duration(2),
        )
        .await;
        assert!(vm.tracking_note().is_some());
        assert_eq!(vm.seek_range(), Some((0, 120)));

        vm.apply(ViewerIntent::Seek(90.0)).unwrap();
        assert_eq!(vm.seek_range(), Some((90, 120)));
        assert!((vm.snapshot().progress - 75.0).abs() < 1e-9);

        let doc = viewer(
            &fx,
            LessonDraft::new(section(), "Guide", LessonKind::Document),
        )
        .await;
        assert!(doc.tracking_note().is_none());
        assert!(doc.seek_range().is_none());
    }

    #[tokio::test]
    async fn restart_resets_time_and_position() {
        let fx = fixture();
        let vm = viewer(
            &fx,
            LessonDraft::new(section(), "Lab", LessonKind::Interactive),
        )
        .await;
        vm.apply(ViewerIntent::Start).unwrap();
        vm.tracker().lock().unwrap().tick();
        vm.apply(ViewerIntent::Complete).unwrap();
        assert_eq!(vm.position_label(), "Done");
        assert_eq!(vm.snapshot().time_spent_secs, 1);

        vm.apply(ViewerIntent::Restart).unwrap();
        let snap = vm.snapshot();
        assert_eq!(snap.time_spent_secs, 0);
        assert!(!snap.completed);
        assert!(vm.is_started());
    }

    #[tokio::test]
    async fn unknown_lesson_is_not_found() {
        let fx = fixture();
        let err = open_viewer(
            &fx.lessons,
            &fx.progress,
            LessonId::new(99),
            FormationId::new(1),
            UserId::new(1),
        )
        .await
        .unwrap_err();
        assert_eq!(err, ViewError::NotFound);
    }

    #[test]
    fn list_joins_progress() {
        let now = fixed_now();
        let lesson = LessonDraft::new(section(), "Intro", LessonKind::Video)
            .with_duration(5)
            .validate(now)
            .unwrap()
            .assign_id(LessonId::new(3), 0);
        let key = ProgressKey::new(LessonId::new(3), FormationId::new(1), UserId::new(1));
        let mut record = ProgressRecord::first_view(key, now);
        let mut tracker = ProgressTracker::new(10.0, ProgressUnit::Second).unwrap();
        tracker.set_position(9.5).unwrap();
        record.apply_snapshot(&tracker.snapshot(), tracker.markers(), now);

        let items = map_lesson_list(&[lesson], &[record]);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, "Video");
        assert_eq!(items[0].duration_label.as_deref(), Some("5 min"));
        assert_eq!(items[0].progress_pct, 95);
        assert!(items[0].completed);
    }
}
