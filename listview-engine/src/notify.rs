//! Notification channel.
//!
//! Every failure the controller catches ends up here instead of propagating
//! into the renderer.

use crate::error::ListViewError;
use tracing::{error, info};

/// Where user-facing outcomes are reported (toasts, status bar, log).
pub trait Notifier: Send + Sync {
    fn notify_success(&self, message: &str);
    fn notify_error(&self, error: &ListViewError, context: &str);
    fn notify_info(&self, message: &str);
}

/// Routes notifications to `tracing`. Used when the host supplies none.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_success(&self, message: &str) {
        info!(kind = "success", "{message}");
    }

    fn notify_error(&self, err: &ListViewError, context: &str) {
        error!(error = %err, "{context}");
    }

    fn notify_info(&self, message: &str) {
        info!(kind = "info", "{message}");
    }
}

/// A notification captured by [`mock::RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    /// Context plus rendered error.
    Error { context: String, error: String },
    Info(String),
}

/// Mock notifiers for testing.
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every notification in order.
    #[derive(Debug, Default)]
    pub struct RecordingNotifier {
        seen: Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        /// Notifications so far, oldest first.
        pub fn notifications(&self) -> Vec<Notification> {
            self.seen.lock().unwrap().clone()
        }

        pub fn successes(&self) -> usize {
            self.count(|n| matches!(n, Notification::Success(_)))
        }

        pub fn errors(&self) -> usize {
            self.count(|n| matches!(n, Notification::Error { .. }))
        }

        pub fn infos(&self) -> usize {
            self.count(|n| matches!(n, Notification::Info(_)))
        }

        fn count(&self, pred: impl Fn(&Notification) -> bool) -> usize {
            self.seen.lock().unwrap().iter().filter(|n| pred(n)).count()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify_success(&self, message: &str) {
            self.seen
                .lock()
                .unwrap()
                .push(Notification::Success(message.to_string()));
        }

        fn notify_error(&self, err: &ListViewError, context: &str) {
            self.seen.lock().unwrap().push(Notification::Error {
                context: context.to_string(),
                error: err.to_string(),
            });
        }

        fn notify_info(&self, message: &str) {
            self.seen
                .lock()
                .unwrap()
                .push(Notification::Info(message.to_string()));
        }
    }
}
