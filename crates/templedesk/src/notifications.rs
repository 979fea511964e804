//! Transient toasts shown in the status area.
//!
//! Validation failures, rejected uploads and auth results are reported here
//! instead of as errors. Several toasts may be visible; each expires on its own.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    fn lifetime(self) -> Duration {
        match self {
            ToastKind::Info => Duration::from_secs(3),
            ToastKind::Success => Duration::from_secs(2),
            ToastKind::Warning => Duration::from_secs(5),
            ToastKind::Error => Duration::from_secs(7),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub text: String,
    pub kind: ToastKind,
    created_at: Instant,
    lifetime: Option<Duration>,
}

impl Toast {
    pub fn new(text: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            text: text.into(),
            kind,
            created_at: Instant::now(),
            lifetime: Some(kind.lifetime()),
        }
    }

    pub fn sticky(text: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            lifetime: None,
            ..Self::new(text, kind)
        }
    }

    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = Some(lifetime);
        self
    }

    pub fn is_expired(&self) -> bool {
        self.lifetime
            .is_some_and(|lifetime| self.created_at.elapsed() > lifetime)
    }
}

pub const MAX_VISIBLE_TOASTS: usize = 3;

#[derive(Debug, Clone, Default)]
pub struct ToastQueue {
    toasts: VecDeque<Toast>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, toast: Toast) {
        match toast.kind {
            ToastKind::Error => log::warn!("toast: {}", toast.text),
            _ => log::debug!("toast: {}", toast.text),
        }
        self.toasts.push_back(toast);
        while self.toasts.len() > MAX_VISIBLE_TOASTS {
            self.toasts.pop_front();
        }
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(Toast::new(text, ToastKind::Info));
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(Toast::new(text, ToastKind::Success));
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.push(Toast::new(text, ToastKind::Warning));
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Toast::new(text, ToastKind::Error));
    }

    /// Drop expired toasts.
    pub fn prune(&mut self) {
        self.toasts.retain(|toast| !toast.is_expired());
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}
