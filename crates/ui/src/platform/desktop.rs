use std::process::Command;

use super::ContentOpener;

/// Hands the target to the operating system's default handler.
pub struct SystemOpener;

impl ContentOpener for SystemOpener {
    fn open(&self, target: &str) {
        let target = target.trim();
        if target.is_empty() {
            return;
        }
        #[cfg(target_os = "macos")]
        let spawned = Command::new("open").arg(target).spawn();
        #[cfg(target_os = "windows")]
        let spawned = Command::new("cmd").args(["/C", "start", "", target]).spawn();
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        let spawned = Command::new("xdg-open").arg(target).spawn();

        if let Err(err) = spawned {
            tracing::warn!(content = target, error = %err, "could not open lesson content");
        }
    }
}
