//! Status polling
//!
//! Every long-running operation (image upload, server boot, stack creation
//! and deletion) waits through [`StatusPoller::wait_for`]. The caller's task
//! is suspended between checks; nothing is spawned.

use crate::error::{CloudError, Result};
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, trace};

/// Default delay between two status checks
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Wait-for-condition primitive parameterized by timeout and interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPoller {
    pub timeout: Duration,
    pub interval: Duration,
    /// When false the deadline is already expired on entry: one check only.
    pub blocking: bool,
}

impl StatusPoller {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout,
            interval,
            blocking: true,
        }
    }

    pub fn with_timeout_secs(timeout_secs: u64) -> Self {
        Self::new(Duration::from_secs(timeout_secs), POLL_INTERVAL)
    }

    pub fn blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    /// Polls `query` until `is_success` holds, `is_failure` holds, or the
    /// timeout elapses.
    ///
    /// - failure is checked first; its status is handed to `on_failure`
    ///   whose error is returned
    /// - success returns `Ok(true)` immediately
    /// - timeout returns `Ok(false)`; callers decide whether that is fatal
    /// - errors from `query` propagate unchanged
    ///
    /// The deadline is measured on the wall clock from entry, so slow
    /// queries consume the budget instead of extending it.
    pub async fn wait_for<S, Q, QF, OK, FAIL, E, EF>(
        &self,
        mut query: Q,
        is_success: OK,
        is_failure: FAIL,
        on_failure: E,
    ) -> Result<bool>
    where
        S: Debug,
        Q: FnMut() -> QF,
        QF: Future<Output = Result<S>>,
        OK: Fn(&S) -> bool,
        FAIL: Fn(&S) -> bool,
        E: FnOnce(S) -> EF,
        EF: Future<Output = CloudError>,
    {
        let start = Instant::now();
        let deadline = if self.blocking {
            start + self.timeout
        } else {
            start
        };

        loop {
            let status = query().await?;

            if is_failure(&status) {
                debug!(?status, "Terminal failure status reached");
                return Err(on_failure(status).await);
            }
            if is_success(&status) {
                debug!(?status, elapsed = ?start.elapsed(), "Expected status reached");
                return Ok(true);
            }

            let now = Instant::now();
            if now >= deadline {
                if self.blocking {
                    debug!(?status, timeout = ?self.timeout, "Timed out waiting for status");
                }
                return Ok(false);
            }

            trace!(?status, "Still waiting");
            sleep(self.interval.min(deadline - now)).await;
        }
    }
}
