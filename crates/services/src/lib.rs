#![forbid(unsafe_code)]

pub mod app_services;
pub mod assignment_service;
pub mod error;
pub mod lesson_service;
pub mod progress;
pub mod quiz_service;

pub use training_core::Clock;

pub use app_services::AppServices;
pub use assignment_service::{AssignmentReport, AssignmentService};
pub use error::{
    AppServicesError, AssignmentServiceError, LessonServiceError, ProgressServiceError,
    QuizServiceError,
};
pub use lesson_service::LessonService;
pub use progress::{LessonProgress, ProgressService, ProgressTicker, TickerConfig};
pub use quiz_service::QuizService;
