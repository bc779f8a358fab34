//! Transient messages shown in the corner of the window.

/// How many toasts stay visible; older ones are dropped first.
pub const MAX_VISIBLE_TOASTS: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

impl ToastKind {
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            ToastKind::Info => "toast info",
            ToastKind::Success => "toast success",
            ToastKind::Error => "toast error",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// Explicit notification state, provided once as a UI context.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotificationCenter {
    next_id: u64,
    toasts: Vec<Toast>,
}

impl NotificationCenter {
    /// Queue a toast and return its id.
    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.toasts.push(Toast {
            id,
            kind,
            message: message.into(),
        });
        if self.toasts.len() > MAX_VISIBLE_TOASTS {
            let overflow = self.toasts.len() - MAX_VISIBLE_TOASTS;
            self.toasts.drain(..overflow);
        }
        id
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Error, message)
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Success, message)
    }

    /// Remove a toast. Returns `false` if it was already gone.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    #[must_use]
    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_dismiss() {
        let mut center = NotificationCenter::default();
        let a = center.error("failed");
        let b = center.success("saved");
        assert_ne!(a, b);
        assert!(center.dismiss(a));
        assert!(!center.dismiss(a));
        assert_eq!(center.toasts().len(), 1);
        assert_eq!(center.toasts()[0].message, "saved");
    }

    #[test]
    fn oldest_toasts_are_dropped() {
        let mut center = NotificationCenter::default();
        for i in 0..5 {
            center.push(ToastKind::Info, format!("m{i}"));
        }
        let messages: Vec<_> = center.toasts().iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["m2", "m3", "m4"]);
    }
}
