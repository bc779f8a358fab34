use std::sync::Arc;

use storage::repository::{LessonRepository, StorageError};
use training_core::model::{Lesson, LessonDraft, LessonId, SectionId};
use training_core::ordering;

use crate::Clock;
use crate::error::LessonServiceError;

/// Lesson authoring: create, edit, delete and reorder lessons of a section.
#[derive(Clone)]
pub struct LessonService {
    clock: Clock,
    lessons: Arc<dyn LessonRepository>,
}

impl LessonService {
    #[must_use]
    pub fn new(clock: Clock, lessons: Arc<dyn LessonRepository>) -> Self {
        Self { clock, lessons }
    }

    /// Validate a draft and append it at the end of its section.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::Lesson` for validation failures.
    /// Returns `LessonServiceError::Storage` if persistence fails.
    pub async fn create_lesson(&self, draft: LessonDraft) -> Result<Lesson, LessonServiceError> {
        let validated = draft.validate(self.clock.now())?;
        let siblings = self.lessons.list_lessons(validated.section_id).await?;
        let position = siblings
            .iter()
            .map(|l| l.position().saturating_add(1))
            .max()
            .unwrap_or(0);

        let id = self.lessons.insert_lesson(&validated, position).await?;
        tracing::debug!(lesson_id = id.value(), position, "lesson created");
        Ok(validated.assign_id(id, position))
    }

    /// Replace the editable fields of an existing lesson.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::Lesson` for validation failures.
    /// Returns `LessonServiceError::Storage` with `NotFound` when the lesson is missing.
    pub async fn update_lesson(
        &self,
        id: LessonId,
        draft: LessonDraft,
    ) -> Result<Lesson, LessonServiceError> {
        let validated = draft.validate(self.clock.now())?;
        let mut lesson = self
            .lessons
            .get_lesson(id)
            .await?
            .ok_or(StorageError::NotFound)?;
        lesson.apply_edit(validated);
        self.lessons.upsert_lesson(&lesson).await?;
        Ok(lesson)
    }

    /// # Errors
    ///
    /// Returns `LessonServiceError::Storage` if the lesson is missing or the delete fails.
    pub async fn delete_lesson(&self, id: LessonId) -> Result<(), LessonServiceError> {
        self.lessons.delete_lesson(id).await?;
        tracing::debug!(lesson_id = id.value(), "lesson deleted");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `LessonServiceError::Storage` if repository access fails.
    pub async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, LessonServiceError> {
        Ok(self.lessons.get_lesson(id).await?)
    }

    /// Lessons of a section in display order.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::Storage` if repository access fails.
    pub async fn list_lessons(&self, section_id: SectionId) -> Result<Vec<Lesson>, LessonServiceError> {
        Ok(self.lessons.list_lessons(section_id).await?)
    }

    /// Move the lesson at index `from` to index `to` and persist the new order.
    ///
    /// Positions are written one lesson at a time and only for lessons whose
    /// position changed. A storage failure partway leaves earlier writes in place.
    ///
    /// # Errors
    ///
    /// Returns `LessonServiceError::Ordering` for out-of-range indices (nothing is written).
    /// Returns `LessonServiceError::Storage` if a write fails.
    pub async fn reorder(
        &self,
        section_id: SectionId,
        from: usize,
        to: usize,
    ) -> Result<Vec<Lesson>, LessonServiceError> {
        let mut lessons = self.lessons.list_lessons(section_id).await?;
        let before: Vec<(LessonId, u32)> =
            lessons.iter().map(|l| (l.id(), l.position())).collect();

        ordering::reorder(&mut lessons, from, to)?;

        let mut written = 0usize;
        for lesson in &lessons {
            let unchanged = before
                .iter()
                .any(|&(id, position)| id == lesson.id() && position == lesson.position());
            if unchanged {
                continue;
            }
            if let Err(err) = self.lessons.upsert_lesson(lesson).await {
                tracing::warn!(
                    section_id = section_id.value(),
                    written,
                    error = %err,
                    "lesson reorder stopped partway"
                );
                return Err(err.into());
            }
            written += 1;
        }

        tracing::info!(section_id = section_id.value(), from, to, written, "lessons reordered");
        Ok(lessons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;
    use training_core::model::LessonKind;
    use training_core::time::fixed_clock;

    fn service() -> LessonService {
        LessonService::new(fixed_clock(), Arc::new(InMemoryRepository::new()))
    }

    async fn seed(svc: &LessonService, titles: &[&str]) -> Vec<Lesson> {
        let mut out = Vec::new();
        for title in titles {
            let draft = LessonDraft::new(SectionId::new(1), *title, LessonKind::Document);
            out.push(svc.create_lesson(draft).await.unwrap());
        }
        out
    }

    fn titles(lessons: &[Lesson]) -> Vec<&str> {
        lessons.iter().map(Lesson::title).collect()
    }

    #[tokio::test]
    async fn created_lessons_are_appended() {
        let svc = service();
        let lessons = seed(&svc, &["A", "B", "C"]).await;
        let positions: Vec<u32> = lessons.iter().map(Lesson::position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let svc = service();
        let err = svc
            .create_lesson(LessonDraft::new(SectionId::new(1), "  ", LessonKind::Video))
            .await
            .unwrap_err();
        assert!(matches!(err, LessonServiceError::Lesson(_)));
        assert!(svc.list_lessons(SectionId::new(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reorder_persists_new_positions() {
        let svc = service();
        seed(&svc, &["A", "B", "C", "D"]).await;

        let reordered = svc.reorder(SectionId::new(1), 3, 0).await.unwrap();
        assert_eq!(titles(&reordered), vec!["D", "A", "B", "C"]);

        let stored = svc.list_lessons(SectionId::new(1)).await.unwrap();
        assert_eq!(titles(&stored), vec!["D", "A", "B", "C"]);
        let positions: Vec<u32> = stored.iter().map(Lesson::position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn reorder_out_of_range_writes_nothing() {
        let svc = service();
        seed(&svc, &["A", "B"]).await;

        let err = svc.reorder(SectionId::new(1), 0, 5).await.unwrap_err();
        assert!(matches!(err, LessonServiceError::Ordering(_)));
        let stored = svc.list_lessons(SectionId::new(1)).await.unwrap();
        assert_eq!(titles(&stored), vec!["A", "B"]);
    }

    #[tokio::test]
    async fn update_keeps_position_and_missing_lesson_is_not_found() {
        let svc = service();
        let lessons = seed(&svc, &["A", "B"]).await;

        let edited = svc
            .update_lesson(
                lessons[1].id(),
                LessonDraft::new(SectionId::new(1), "B2", LessonKind::Video).with_duration(4),
            )
            .await
            .unwrap();
        assert_eq!(edited.title(), "B2");
        assert_eq!(edited.position(), 1);
        assert_eq!(edited.kind(), LessonKind::Video);

        let err = svc
            .update_lesson(
                LessonId::new(99),
                LessonDraft::new(SectionId::new(1), "X", LessonKind::Video),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LessonServiceError::Storage(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn deleted_lesson_disappears() {
        let svc = service();
        let lessons = seed(&svc, &["A"]).await;
        svc.delete_lesson(lessons[0].id()).await.unwrap();
        assert!(svc.get_lesson(lessons[0].id()).await.unwrap().is_none());
    }
}
