mod assignment_vm;
mod lesson_vm;
mod markdown_vm;
mod notifications;
mod quiz_vm;
mod time_fmt;

pub use assignment_vm::{
    AssignmentFormVm, FormError, assignment_error_message, assignment_success_message,
};
pub use lesson_vm::{
    LessonListItemVm, LessonViewerVm, ViewerIntent, kind_label, map_lesson_list, open_viewer,
    whole_percent,
};
pub use markdown_vm::{markdown_to_html, sanitize_html};
pub use notifications::{MAX_VISIBLE_TOASTS, NotificationCenter, Toast, ToastKind};
pub use quiz_vm::{
    AnswerVm, QuestionVm, QuizIntent, QuizPreviewVm, ScoreVm, load_quiz_for_lesson,
};
pub use time_fmt::{format_clock, format_datetime, format_elapsed};
