//! Built-in wait policies and the root container

use async_trait::async_trait;
use std::time::Duration;
use tracing::trace;

use crate::ports::{AsyncReloadable, AsyncWaiter, Reloadable, Waiter};

/// Blocks the calling thread for a fixed delay.
#[derive(Clone, Debug)]
pub struct FixedDelayWaiter {
    delay: Duration,
}

impl FixedDelayWaiter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedDelayWaiter {
    fn default() -> Self {
        Self::from_millis(100)
    }
}

impl Waiter for FixedDelayWaiter {
    fn sleep(&self) {
        trace!(delay_ms = self.delay.as_millis() as u64, "waiting before next attempt");
        std::thread::sleep(self.delay);
    }
}

/// Suspends the current task with `tokio::time::sleep`.
#[derive(Clone, Debug)]
pub struct TokioWaiter {
    delay: Duration,
}

impl TokioWaiter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }
}

#[async_trait]
impl AsyncWaiter for TokioWaiter {
    async fn sleep(&self) {
        trace!(delay_ms = self.delay.as_millis() as u64, "waiting before next attempt");
        tokio::time::sleep(self.delay).await;
    }
}

/// No-op waiter for tests and already-settled UIs.
#[derive(Clone, Debug, Default)]
pub struct NoWait;

impl Waiter for NoWait {
    fn sleep(&self) {}
}

#[async_trait]
impl AsyncWaiter for NoWait {
    async fn sleep(&self) {}
}

/// Container of top-level widgets; there is nothing above it to reload.
#[derive(Clone, Debug, Default)]
pub struct NoReload;

impl Reloadable for NoReload {
    fn reload(&self) {}
}

#[async_trait]
impl AsyncReloadable for NoReload {
    async fn reload(&self) {}
}
