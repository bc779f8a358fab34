use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{LessonId, SectionId};
use crate::model::metadata::LessonMetadata;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson title cannot be empty")]
    EmptyTitle,

    #[error("unknown lesson content type: {0}")]
    UnknownKind(String),

    #[error("file reference cannot be blank")]
    BlankFileReference,
}

//
// ─── CONTENT KIND ──────────────────────────────────────────────────────────────
//

/// What a lesson holds, which decides how its progress is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LessonKind {
    Video,
    Document,
    Presentation,
    Interactive,
}

impl LessonKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LessonKind::Video => "video",
            LessonKind::Document => "document",
            LessonKind::Presentation => "presentation",
            LessonKind::Interactive => "interactive",
        }
    }

    /// # Errors
    ///
    /// Returns `LessonError::UnknownKind` for anything but the four known kinds.
    pub fn parse(raw: &str) -> Result<Self, LessonError> {
        match raw {
            "video" => Ok(Self::Video),
            "document" => Ok(Self::Document),
            "presentation" => Ok(Self::Presentation),
            "interactive" => Ok(Self::Interactive),
            other => Err(LessonError::UnknownKind(other.to_string())),
        }
    }
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Form input for creating or editing a lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonDraft {
    pub section_id: SectionId,
    pub title: String,
    pub description: String,
    pub kind: LessonKind,
    pub duration_minutes: u32,
    pub file_ref: Option<String>,
    pub metadata: Option<LessonMetadata>,
}

impl LessonDraft {
    #[must_use]
    pub fn new(section_id: SectionId, title: impl Into<String>, kind: LessonKind) -> Self {
        Self {
            section_id,
            title: title.into(),
            description: String::new(),
            kind,
            duration_minutes: 0,
            file_ref: None,
            metadata: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_file(mut self, file_ref: impl Into<String>) -> Self {
        self.file_ref = Some(file_ref.into());
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, metadata: LessonMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// # Errors
    ///
    /// Returns `LessonError` when the title is blank or the file reference is blank.
    pub fn validate(self, now: DateTime<Utc>) -> Result<ValidatedLesson, LessonError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(LessonError::EmptyTitle);
        }
        if self.file_ref.as_deref().is_some_and(|f| f.trim().is_empty()) {
            return Err(LessonError::BlankFileReference);
        }

        Ok(ValidatedLesson {
            section_id: self.section_id,
            title: title.to_string(),
            description: self.description.trim().to_string(),
            kind: self.kind,
            duration_minutes: self.duration_minutes,
            file_ref: self.file_ref,
            metadata: self.metadata,
            created_at: now,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedLesson {
    pub section_id: SectionId,
    pub title: String,
    pub description: String,
    pub kind: LessonKind,
    pub duration_minutes: u32,
    pub file_ref: Option<String>,
    pub metadata: Option<LessonMetadata>,
    pub created_at: DateTime<Utc>,
}

impl ValidatedLesson {
    #[must_use]
    pub fn assign_id(self, id: LessonId, position: u32) -> Lesson {
        Lesson {
            id,
            section_id: self.section_id,
            title: self.title,
            description: self.description,
            kind: self.kind,
            position,
            duration_minutes: self.duration_minutes,
            file_ref: self.file_ref,
            metadata: self.metadata,
            created_at: self.created_at,
        }
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// A unit of content inside a formation section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    section_id: SectionId,
    title: String,
    description: String,
    kind: LessonKind,
    position: u32,
    duration_minutes: u32,
    file_ref: Option<String>,
    metadata: Option<LessonMetadata>,
    created_at: DateTime<Utc>,
}

impl Lesson {
    /// Rehydrate a lesson loaded from storage.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTitle` if the stored title is blank.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: LessonId,
        section_id: SectionId,
        title: String,
        description: String,
        kind: LessonKind,
        position: u32,
        duration_minutes: u32,
        file_ref: Option<String>,
        metadata: Option<LessonMetadata>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, LessonError> {
        if title.trim().is_empty() {
            return Err(LessonError::EmptyTitle);
        }
        Ok(Self {
            id,
            section_id,
            title,
            description,
            kind,
            position,
            duration_minutes,
            file_ref,
            metadata,
            created_at,
        })
    }

    /// Replace editable fields from a validated edit form, keeping id, position and creation time.
    pub fn apply_edit(&mut self, edit: ValidatedLesson) {
        self.section_id = edit.section_id;
        self.title = edit.title;
        self.description = edit.description;
        self.kind = edit.kind;
        self.duration_minutes = edit.duration_minutes;
        self.file_ref = edit.file_ref;
        self.metadata = edit.metadata;
    }

    pub fn set_position(&mut self, position: u32) {
        self.position = position;
    }

    #[must_use]
    pub fn id(&self) -> LessonId {
        self.id
    }

    #[must_use]
    pub fn section_id(&self) -> SectionId {
        self.section_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn kind(&self) -> LessonKind {
        self.kind
    }

    #[must_use]
    pub fn position(&self) -> u32 {
        self.position
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn file_ref(&self) -> Option<&str> {
        self.file_ref.as_deref()
    }

    #[must_use]
    pub fn metadata(&self) -> Option<&LessonMetadata> {
        self.metadata.as_ref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
