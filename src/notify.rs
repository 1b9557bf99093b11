//! User-visible notifications.

use std::sync::Mutex;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Operation completed.
    Success,
    /// Operation failed.
    Error,
}

/// A message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Text shown to the user.
    pub message: String,
}

/// Sink for user-visible notifications (toasts, status lines, ...).
pub trait Notifier: Send + Sync {
    /// Delivers a notification.
    fn notify(&self, notification: Notification);

    /// Reports a successful operation.
    fn success(&self, message: &str) {
        self.notify(Notification {
            level: NotificationLevel::Success,
            message: message.to_string(),
        });
    }

    /// Reports a failed operation.
    fn error(&self, message: &str) {
        self.notify(Notification {
            level: NotificationLevel::Error,
            message: message.to_string(),
        });
    }
}

impl<N: Notifier + ?Sized> Notifier for std::sync::Arc<N> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

/// Forwards notifications to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => tracing::info!("{}", notification.message),
            NotificationLevel::Error => tracing::error!("{}", notification.message),
        }
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications received so far, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Messages of error notifications, oldest first.
    pub fn errors(&self) -> Vec<String> {
        self.messages(NotificationLevel::Error)
    }

    /// Messages of success notifications, oldest first.
    pub fn successes(&self) -> Vec<String> {
        self.messages(NotificationLevel::Success)
    }

    fn messages(&self, level: NotificationLevel) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter(|n| n.level == level)
            .map(|n| n.message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_notifier_splits_levels() {
        let notifier = RecordingNotifier::new();
        notifier.error("Invalid API key");
        notifier.success("Image deleted");
        notifier.error("Failed to download image");

        assert_eq!(
            notifier.errors(),
            vec!["Invalid API key", "Failed to download image"]
        );
        assert_eq!(notifier.successes(), vec!["Image deleted"]);
        assert_eq!(notifier.notifications().len(), 3);
    }
}
