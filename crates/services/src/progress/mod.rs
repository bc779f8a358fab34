//! Lesson viewing progress: persistence and the once-per-second ticker.

mod service;
mod ticker;

pub use service::{LessonProgress, ProgressService};
pub use ticker::{ProgressTicker, TickerConfig};
