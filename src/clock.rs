//! Injectable sleeping for the readiness poller.
//!
//! The poller never calls `tokio::time::sleep` directly; it sleeps through
//! [`Clock`], which tests replace with one that records each interval.

use async_trait::async_trait;
use std::time::Duration;

/// Suspends the current task between poll attempts.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production clock backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
