#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod ordering;
pub mod preview;
pub mod progress;
pub mod scoring;
pub mod time;

pub use error::Error;
pub use time::Clock;
