mod assignment;
mod ids;
mod lesson;
mod metadata;
mod progress;
mod quiz;

pub use ids::{FormationId, GroupId, LessonId, ParseIdError, QuizId, SectionId, UserId};

pub use assignment::{
    Assignee, Assignment, AssignmentDraft, AssignmentError, AssignmentPlan, AssignmentTarget,
    TargetMode,
};
pub use lesson::{Lesson, LessonDraft, LessonError, LessonKind, ValidatedLesson};
pub use metadata::{ContentSource, LessonMetadata, MetadataError};
pub use progress::{PositionMarkers, ProgressKey, ProgressRecord, ProgressRecordError};
pub use quiz::{Answer, Question, QuestionKind, Quiz, QuizError, QuizSettings};
