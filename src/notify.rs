//! Notification surface called after every operation outcome.

use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Emits notices as tracing events.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Info => {
                tracing::info!(title = %notice.title, "{}", notice.description)
            }
            Severity::Destructive => {
                tracing::warn!(title = %notice.title, "{}", notice.description)
            }
        }
    }
}

/// Keeps every notice in memory so tests can assert on outcomes.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|notices| notices.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices
            .lock()
            .ok()
            .and_then(|notices| notices.last().cloned())
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|mut notices| std::mem::take(&mut *notices))
            .unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        tracing::debug!(title = %notice.title, severity = ?notice.severity, "notice recorded");
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_keeps_order_and_drains() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Notice::info("Employee Added", "ok"));
        notifier.notify(Notice::destructive("Error", "boom"));

        assert_eq!(notifier.last().unwrap().severity, Severity::Destructive);
        let drained = notifier.take();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].title, "Employee Added");
        assert!(notifier.notices().is_empty());
    }
}
