use std::sync::Arc;

mod desktop;

/// Opens lesson content (remote URLs or attached files) outside the app.
pub trait ContentOpener: Send + Sync {
    fn open(&self, target: &str);
}

pub type ContentOpenerRef = Arc<dyn ContentOpener>;

pub use desktop::SystemOpener;
