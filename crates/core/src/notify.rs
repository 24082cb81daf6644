//! User-facing notifications.

use chrono::{DateTime, Local};
use tokio::sync::mpsc;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Informational message.
    Info,
    /// An operation failed.
    Error,
}

/// A message destined for the user. Carries no structured error payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Text shown to the user.
    pub message: String,
    /// When the notification was raised.
    pub raised_at: DateTime<Local>,
}

impl Notification {
    /// Build an error notification stamped with the current time.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    /// Build an informational notification stamped with the current time.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            raised_at: Local::now(),
        }
    }
}

/// Fire-and-forget sink for notifications.
pub trait Notifier: Send + Sync {
    /// Deliver `notification`. Delivery failures are dropped.
    fn notify(&self, notification: Notification);
}

impl Notifier for mpsc::UnboundedSender<Notification> {
    fn notify(&self, notification: Notification) {
        // A closed receiver means nobody is listening any more.
        let _ = self.send(notification);
    }
}

/// Notifier that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notification: Notification) {}
}
