mod assign;
mod home;
mod lesson_viewer;
mod lessons;
mod quiz_preview;
mod state;
pub(crate) mod toasts;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use assign::AssignView;
pub use home::HomeView;
pub use lesson_viewer::LessonView;
pub use lessons::LessonsView;
pub use quiz_preview::QuizView;
pub use state::{ViewError, ViewState, view_state_from_resource};
pub use toasts::{Toasts, notify, use_notification_provider, use_notifications};
