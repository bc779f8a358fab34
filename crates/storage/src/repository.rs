use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use training_core::model::{
    Assignee, Assignment, FormationId, Lesson, LessonId, ProgressKey, ProgressRecord, Quiz,
    QuizId, SectionId, UserId, ValidatedLesson,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Lessons within formation sections.
#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// Store a new lesson at `position` and return its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lesson cannot be stored.
    async fn insert_lesson(
        &self,
        lesson: &ValidatedLesson,
        position: u32,
    ) -> Result<LessonId, StorageError>;

    /// Persist or update a lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the lesson cannot be stored.
    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError>;

    /// Lessons of a section ordered by position, then id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn list_lessons(&self, section_id: SectionId) -> Result<Vec<Lesson>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the lesson does not exist.
    async fn delete_lesson(&self, id: LessonId) -> Result<(), StorageError>;
}

/// Viewing history per (lesson, formation, user).
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn get_progress(&self, key: ProgressKey) -> Result<Option<ProgressRecord>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError>;

    /// All records of a user within a formation.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn list_progress(
        &self,
        user_id: UserId,
        formation_id: FormationId,
    ) -> Result<Vec<ProgressRecord>, StorageError>;
}

#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Replace the quiz and all of its questions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the quiz cannot be stored.
    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn find_quiz_for_lesson(&self, lesson_id: LessonId)
    -> Result<Option<Quiz>, StorageError>;
}

#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the assignee already has this formation.
    async fn insert_assignment(&self, assignment: &Assignment) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn list_assignments(
        &self,
        formation_id: FormationId,
    ) -> Result<Vec<Assignment>, StorageError>;
}

//
// ─── IN-MEMORY ─────────────────────────────────────────────────────────────────
//

#[derive(Default)]
struct MemoryState {
    next_lesson_id: u64,
    lessons: HashMap<LessonId, Lesson>,
    progress: HashMap<ProgressKey, ProgressRecord>,
    quizzes: HashMap<QuizId, Quiz>,
    assignments: Vec<Assignment>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl LessonRepository for InMemoryRepository {
    async fn insert_lesson(
        &self,
        lesson: &ValidatedLesson,
        position: u32,
    ) -> Result<LessonId, StorageError> {
        let mut guard = self.lock()?;
        let next = guard
            .lessons
            .keys()
            .map(LessonId::value)
            .max()
            .unwrap_or(0)
            .max(guard.next_lesson_id)
            + 1;
        guard.next_lesson_id = next;
        let id = LessonId::new(next);
        guard
            .lessons
            .insert(id, lesson.clone().assign_id(id, position));
        Ok(id)
    }

    async fn upsert_lesson(&self, lesson: &Lesson) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.lessons.insert(lesson.id(), lesson.clone());
        Ok(())
    }

    async fn get_lesson(&self, id: LessonId) -> Result<Option<Lesson>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.lessons.get(&id).cloned())
    }

    async fn list_lessons(&self, section_id: SectionId) -> Result<Vec<Lesson>, StorageError> {
        let guard = self.lock()?;
        let mut lessons: Vec<Lesson> = guard
            .lessons
            .values()
            .filter(|l| l.section_id() == section_id)
            .cloned()
            .collect();
        lessons.sort_by_key(|l| (l.position(), l.id()));
        Ok(lessons)
    }

    async fn delete_lesson(&self, id: LessonId) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard
            .lessons
            .remove(&id)
            .map(|_| ())
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn get_progress(&self, key: ProgressKey) -> Result<Option<ProgressRecord>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.progress.get(&key).cloned())
    }

    async fn upsert_progress(&self, record: &ProgressRecord) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.progress.insert(record.key(), record.clone());
        Ok(())
    }

    async fn list_progress(
        &self,
        user_id: UserId,
        formation_id: FormationId,
    ) -> Result<Vec<ProgressRecord>, StorageError> {
        let guard = self.lock()?;
        let mut records: Vec<ProgressRecord> = guard
            .progress
            .values()
            .filter(|r| r.key().user_id == user_id && r.key().formation_id == formation_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.key().lesson_id);
        Ok(records)
    }
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.quizzes.insert(quiz.id(), quiz.clone());
        Ok(())
    }

    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.quizzes.get(&id).cloned())
    }

    async fn find_quiz_for_lesson(
        &self,
        lesson_id: LessonId,
    ) -> Result<Option<Quiz>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .quizzes
            .values()
            .filter(|q| q.lesson_id() == Some(lesson_id))
            .min_by_key(|q| q.id())
            .cloned())
    }
}

#[async_trait]
impl AssignmentRepository for InMemoryRepository {
    async fn insert_assignment(&self, assignment: &Assignment) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        let duplicate = guard.assignments.iter().any(|a| {
            a.formation_id == assignment.formation_id && a.assignee == assignment.assignee
        });
        if duplicate {
            return Err(StorageError::Conflict);
        }
        guard.assignments.push(assignment.clone());
        Ok(())
    }

    async fn list_assignments(
        &self,
        formation_id: FormationId,
    ) -> Result<Vec<Assignment>, StorageError> {
        let guard = self.lock()?;
        let mut out: Vec<Assignment> = guard
            .assignments
            .iter()
            .filter(|a| a.formation_id == formation_id)
            .cloned()
            .collect();
        out.sort_by_key(|a| assignee_sort_key(a.assignee));
        Ok(out)
    }
}

/// Users first, then groups, each by id.
pub(crate) fn assignee_sort_key(assignee: Assignee) -> (u8, u64) {
    match assignee {
        Assignee::User(id) => (0, id.value()),
        Assignee::Group(id) => (1, id.value()),
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub lessons: Arc<dyn LessonRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub assignments: Arc<dyn AssignmentRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            lessons: Arc::new(repo.clone()),
            progress: Arc::new(repo.clone()),
            quizzes: Arc::new(repo.clone()),
            assignments: Arc::new(repo),
        }
    }
}
