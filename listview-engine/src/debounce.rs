//! Search debouncing.
//!
//! Turns a burst of keystrokes into one settled value once the input has
//! been quiet for the full period. A newer value cancels the pending one and
//! restarts the period; dropping the debouncer cancels whatever is pending.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Default quiet period.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Debounces raw search text.
#[derive(Debug)]
pub struct SearchDebouncer {
    quiet_period: Duration,
    pending: Option<JoinHandle<()>>,
}

impl SearchDebouncer {
    /// Creates a debouncer with the given quiet period.
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            pending: None,
        }
    }

    /// Returns the quiet period.
    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    /// Whether an emission is scheduled and has not yet fired.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Records a new raw value. `on_settle` runs with it after the quiet
    /// period unless another value arrives first.
    ///
    /// Must be called from within a tokio runtime.
    pub fn push<F, Fut>(&mut self, value: String, on_settle: F)
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let quiet_period = self.quiet_period;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            on_settle(value).await;
        }));
    }

    /// Cancels any pending emission.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_PERIOD)
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
