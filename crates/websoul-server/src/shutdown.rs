//! Stopping the relay: cancel the listener, then drain in-flight inquiries.

use std::time::Duration;

use serde::Serialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How long an in-flight inquiry (usually an SMTP exchange) may take to
/// finish once shutdown starts.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// How the server task ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DrainOutcome {
    /// The task finished on its own.
    Drained,
    /// The task outlived the drain timeout and was aborted.
    Aborted,
}

/// Cancellation shared between the listener and whoever stops it.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
    drain_timeout: Duration,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_DRAIN_TIMEOUT)
    }
}

impl ShutdownCoordinator {
    /// Coordinator that waits at most `drain_timeout` for the server task.
    pub fn new(drain_timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            drain_timeout,
        }
    }

    /// Token the listener waits on.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Stop accepting connections. Idempotent.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    /// Whether [`Self::shutdown`] has been called.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel, then wait for `server` to finish, aborting it after the
    /// drain timeout.
    pub async fn drain(&self, server: JoinHandle<()>) -> DrainOutcome {
        self.shutdown();
        info!(timeout = ?self.drain_timeout, "draining inquiry relay");

        let abort = server.abort_handle();
        match tokio::time::timeout(self.drain_timeout, server).await {
            Ok(Ok(())) => DrainOutcome::Drained,
            Ok(Err(e)) => {
                warn!(error = %e, "relay task ended abnormally");
                DrainOutcome::Drained
            }
            Err(_) => {
                abort.abort();
                warn!(timeout = ?self.drain_timeout, "relay did not drain in time, aborting");
                DrainOutcome::Aborted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_running() {
        let coord = ShutdownCoordinator::default();
        assert!(!coord.is_shutting_down());
        assert!(!coord.token().is_cancelled());
    }

    #[test]
    fn shutdown_cancels_handed_out_tokens() {
        let coord = ShutdownCoordinator::default();
        let token = coord.token();
        coord.shutdown();
        coord.shutdown();
        assert!(token.is_cancelled());
        assert!(coord.is_shutting_down());
    }

    #[tokio::test]
    async fn drains_task_that_honours_the_token() {
        let coord = ShutdownCoordinator::default();
        let token = coord.token();
        let server = tokio::spawn(async move { token.cancelled().await });

        assert_eq!(coord.drain(server).await, DrainOutcome::Drained);
    }

    #[tokio::test(start_paused = true)]
    async fn aborts_task_that_ignores_the_token() {
        let coord = ShutdownCoordinator::new(Duration::from_millis(100));
        let server = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(300)).await;
        });

        assert_eq!(coord.drain(server).await, DrainOutcome::Aborted);
        assert!(coord.is_shutting_down());
    }

    #[tokio::test]
    async fn panicked_task_counts_as_drained() {
        let coord = ShutdownCoordinator::default();
        let server = tokio::spawn(async { panic!("smtp client panicked") });
        tokio::task::yield_now().await;

        assert_eq!(coord.drain(server).await, DrainOutcome::Drained);
    }
}
