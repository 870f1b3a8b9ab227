//! Retry-with-reload synchronization.
//!
//! An operation is attempted until it succeeds or the policy's retry budget is
//! used up. After every retryable failure the waiter pauses (except after the
//! final attempt) and, each time the failure count reaches a multiple of
//! `reload_every`, the enclosing container is reloaded, including on the final
//! attempt. Non-retryable failures end the loop at once.
//!
//! Concurrent synchronizations against one container may interleave their
//! reloads; nothing here serializes `Reloadable::reload`.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::errors::{SyncError, TestableError};
use crate::policy::RetryPolicy;
use crate::ports::{AsyncReloadable, AsyncWaiter, Reloadable, Waiter};

/// Collaborators of a blocking synchronization.
#[derive(Clone, Copy)]
pub struct SyncDeps<'a> {
    pub policy: &'a RetryPolicy,
    pub waiter: &'a dyn Waiter,
    pub container: &'a dyn Reloadable,
    pub cancel: Option<&'a CancellationToken>,
}

impl<'a> SyncDeps<'a> {
    pub fn new(
        policy: &'a RetryPolicy,
        waiter: &'a dyn Waiter,
        container: &'a dyn Reloadable,
    ) -> Self {
        Self {
            policy,
            waiter,
            container,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: &'a CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Collaborators of an async synchronization.
#[derive(Clone, Copy)]
pub struct AsyncSyncDeps<'a> {
    pub policy: &'a RetryPolicy,
    pub waiter: &'a dyn AsyncWaiter,
    pub container: &'a dyn AsyncReloadable,
    pub cancel: Option<&'a CancellationToken>,
}

impl<'a> AsyncSyncDeps<'a> {
    pub fn new(
        policy: &'a RetryPolicy,
        waiter: &'a dyn AsyncWaiter,
        container: &'a dyn AsyncReloadable,
    ) -> Self {
        Self {
            policy,
            waiter,
            container,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: &'a CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Poll `operation` until it succeeds, blocking between attempts.
#[instrument(
    skip_all,
    fields(
        max_retries = deps.policy.max_retries.get(),
        reload_every = deps.policy.reload_every.get()
    )
)]
pub fn synchronize<T, F>(mut operation: F, deps: SyncDeps<'_>) -> Result<T, SyncError>
where
    F: FnMut() -> Result<T, TestableError>,
{
    let mut attempt = SyncAttempt::new();
    loop {
        if is_cancelled(deps.cancel) {
            return Err(attempt.cancelled());
        }
        let err = match operation() {
            Ok(value) => {
                debug!(failures = attempt.index, "testable synchronized");
                return Ok(value);
            }
            Err(err) => err,
        };
        match attempt.record_failure(err, deps.policy)? {
            Step::Retry { reload } => {
                deps.waiter.sleep();
                if reload {
                    debug!(failures = attempt.index, "reloading container");
                    deps.container.reload();
                }
            }
            Step::Exhausted { reload, error } => {
                if reload {
                    debug!(failures = attempt.index, "reloading container");
                    deps.container.reload();
                }
                warn!(attempts = attempt.index, "retry budget exhausted");
                return Err(error);
            }
        }
    }
}

/// Async counterpart of [`synchronize`]; suspends instead of blocking.
#[instrument(
    skip_all,
    fields(
        max_retries = deps.policy.max_retries.get(),
        reload_every = deps.policy.reload_every.get()
    )
)]
pub async fn synchronize_async<T, F, Fut>(
    mut operation: F,
    deps: AsyncSyncDeps<'_>,
) -> Result<T, SyncError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TestableError>>,
{
    let mut attempt = SyncAttempt::new();
    loop {
        if is_cancelled(deps.cancel) {
            return Err(attempt.cancelled());
        }
        let err = match operation().await {
            Ok(value) => {
                debug!(failures = attempt.index, "testable synchronized");
                return Ok(value);
            }
            Err(err) => err,
        };
        match attempt.record_failure(err, deps.policy)? {
            Step::Retry { reload } => {
                deps.waiter.sleep().await;
                if reload {
                    debug!(failures = attempt.index, "reloading container");
                    deps.container.reload().await;
                }
            }
            Step::Exhausted { reload, error } => {
                if reload {
                    debug!(failures = attempt.index, "reloading container");
                    deps.container.reload().await;
                }
                warn!(attempts = attempt.index, "retry budget exhausted");
                return Err(error);
            }
        }
    }
}

fn is_cancelled(cancel: Option<&CancellationToken>) -> bool {
    cancel.map_or(false, CancellationToken::is_cancelled)
}

/// What the loop does after a retryable failure.
enum Step {
    Retry { reload: bool },
    Exhausted { reload: bool, error: SyncError },
}

/// Per-call state; never outlives one synchronization.
struct SyncAttempt {
    index: u32,
    last_error: Option<TestableError>,
}

impl SyncAttempt {
    fn new() -> Self {
        Self {
            index: 0,
            last_error: None,
        }
    }

    fn record_failure(
        &mut self,
        err: TestableError,
        policy: &RetryPolicy,
    ) -> Result<Step, SyncError> {
        if !err.is_retryable() {
            return Err(match err {
                TestableError::Cancelled => self.cancelled(),
                fatal => {
                    warn!(failures = self.index, error = %fatal, "non-retryable testable failure");
                    SyncError::Fatal {
                        attempts: self.index,
                        source: fatal,
                    }
                }
            });
        }

        self.index += 1;
        debug!(attempt = self.index, error = %err, "testable not ready");
        let reload = policy.reload_due(self.index);
        if policy.exhausted(self.index) {
            return Ok(Step::Exhausted {
                reload,
                error: SyncError::ElementNotFound {
                    attempts: self.index,
                    source: err,
                },
            });
        }
        self.last_error = Some(err);
        Ok(Step::Retry { reload })
    }

    fn cancelled(&mut self) -> SyncError {
        SyncError::Cancelled {
            attempts: self.index,
            last_error: self.last_error.take(),
        }
    }
}
