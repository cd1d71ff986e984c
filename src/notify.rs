//! Transient toast notifications
//!
//! A toast replaces whatever toast was showing and hides itself once its
//! display duration has elapsed.

use std::time::{Duration, Instant};

/// Visual category of a toast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// A message shown to the user for a short time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    shown_at: Instant,
}

/// Holds the currently displayed toast, if any
#[derive(Debug, Clone)]
pub struct Notifier {
    duration: Duration,
    current: Option<Toast>,
}

impl Notifier {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            current: None,
        }
    }

    /// Shows a success toast
    pub fn success(&mut self, message: impl Into<String>) {
        self.show(message.into(), ToastKind::Success, Instant::now());
    }

    /// Shows an error toast
    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}", message);
        self.show(message, ToastKind::Error, Instant::now());
    }

    fn show(&mut self, message: String, kind: ToastKind, shown_at: Instant) {
        self.current = Some(Toast {
            message,
            kind,
            shown_at,
        });
    }

    /// The toast still visible at `now`
    pub fn visible_at(&self, now: Instant) -> Option<&Toast> {
        self.current
            .as_ref()
            .filter(|toast| now.saturating_duration_since(toast.shown_at) < self.duration)
    }

    /// The toast visible right now
    pub fn visible(&self) -> Option<&Toast> {
        self.visible_at(Instant::now())
    }

    /// Forgets a toast whose time is up; returns true if one was dismissed
    pub fn dismiss_expired(&mut self, now: Instant) -> bool {
        if self.current.is_some() && self.visible_at(now).is_none() {
            self.current = None;
            return true;
        }
        false
    }
}
