use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::engine::{synchronize, SyncDeps};
use crate::errors::{SyncError, TestableError};
use crate::policy::RetryPolicy;
use crate::ports::{Reloadable, TestablePort, Waiter};

/// How lookup and action are wrapped in retry loops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryLayering {
    /// One loop around locate-then-act.
    #[default]
    Single,
    /// The lookup gets its own loop inside the locate-then-act loop; a
    /// missing element costs up to `max_retries²` lookups.
    Nested,
}

/// A UI construct bound to its container, waiter and retry policy.
///
/// All collaborators are required at construction; a widget never retries or
/// sleeps by itself, it hands every platform call to the engine.
pub struct Widget<P: TestablePort> {
    port: P,
    container: Arc<dyn Reloadable>,
    waiter: Arc<dyn Waiter>,
    policy: RetryPolicy,
    layering: RetryLayering,
    cancel: Option<CancellationToken>,
}

impl<P: TestablePort> Widget<P> {
    pub fn new(
        port: P,
        container: Arc<dyn Reloadable>,
        waiter: Arc<dyn Waiter>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            port,
            container,
            waiter,
            policy,
            layering: RetryLayering::Single,
            cancel: None,
        }
    }

    pub fn with_layering(mut self, layering: RetryLayering) -> Self {
        self.layering = layering;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn layering(&self) -> RetryLayering {
        self.layering
    }

    /// Locate the testable and perform the widget's action on it.
    #[instrument(skip_all, fields(layering = ?self.layering))]
    pub fn perform_synchronized_action(&self) -> Result<P::Testable, SyncError> {
        match self.layering {
            RetryLayering::Single => self.sync(|| {
                let testable = self.port.locate()?;
                self.port.act(&testable)?;
                Ok(testable)
            }),
            RetryLayering::Nested => self.sync(|| {
                let testable = self.wait_for_testable()?;
                self.port.act(&testable)?;
                Ok(testable)
            }),
        }
    }

    /// Locate the testable, retrying until it shows up.
    pub fn wait_for_testable(&self) -> Result<P::Testable, SyncError> {
        self.sync(|| self.port.locate())
    }

    /// Locate the testable and run a query against it, both under one retry loop.
    pub fn synchronize_on<R, F>(&self, mut query: F) -> Result<R, SyncError>
    where
        F: FnMut(&P, &P::Testable) -> Result<R, TestableError>,
    {
        self.sync(|| {
            let testable = self.port.locate()?;
            query(&self.port, &testable)
        })
    }

    fn sync<T, F>(&self, operation: F) -> Result<T, SyncError>
    where
        F: FnMut() -> Result<T, TestableError>,
    {
        let mut deps = SyncDeps::new(&self.policy, self.waiter.as_ref(), self.container.as_ref());
        if let Some(cancel) = self.cancel.as_ref() {
            deps = deps.with_cancel(cancel);
        }
        synchronize(operation, deps)
    }
}
