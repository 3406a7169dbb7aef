use std::sync::Mutex;
use std::time::Duration;

use colored::*;

/// Success toasts disappear on their own after this long.
pub const SUCCESS_DISMISS_AFTER: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Transient, auto-dismissed.
    Success {
        message: String,
        dismiss_after: Duration,
    },
    /// Completed with caveats, e.g. a bulk upload with failed rows.
    Warning { message: String },
    /// Blocking until dismissed.
    Error { message: String },
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Notification::Success {
            message: message.into(),
            dismiss_after: SUCCESS_DISMISS_AFTER,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Notification::Warning {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notification::Error {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Notification::Success { message, .. }
            | Notification::Warning { message }
            | Notification::Error { message } => message,
        }
    }
}

pub trait Notifier {
    fn notify(&self, notification: Notification);
}

/// Prints notifications to the terminal.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match &notification {
            Notification::Success { message, .. } => println!("{} {}", "✔".green(), message.green()),
            Notification::Warning { message } => println!("{} {}", "!".yellow(), message.yellow()),
            Notification::Error { message } => eprintln!("{} {}", "✘".red(), message.red().bold()),
        }
    }
}

/// Keeps every notification in order. Useful for embedding and for tests.
#[derive(Default)]
pub struct NotificationLog {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Notification> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<Notification> {
        self.entries().pop()
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(notification);
        }
    }
}
