use std::error::Error as _;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use clap::{Args, ValueEnum};
use futon_widgets::{
    synchronize_async, AsyncReloadable, AsyncSyncDeps, AsyncWaiter, NoWait, Reloadable,
    RetryLayering, RetryPolicy, SyncError, TestableError, TestablePort, Waiter, Widget,
};
use serde::Serialize;
use tracing::info;

use crate::cli::context::CliContext;
use crate::cli::output::{print_structured, OutputFormat};

#[derive(Args, Clone, Debug)]
pub struct SimulateArgs {
    /// Lookups that report "not ready" before the element appears
    #[arg(long, default_value_t = 3)]
    pub fail_first: u32,

    /// Lookup number (1-indexed) that fails with a non-retryable error
    #[arg(long)]
    pub fatal_at: Option<u32>,

    /// Override max.retries for this run
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Override reload.range for this run
    #[arg(long)]
    pub reload_range: Option<u32>,

    /// Retry loop layout around lookup and action
    #[arg(long, value_enum, default_value_t = LayeringArg::Single)]
    pub layering: LayeringArg,

    /// Engine flavour
    #[arg(long, value_enum, default_value_t = EngineArg::Blocking)]
    pub engine: EngineArg,

    /// Skip the pause between attempts
    #[arg(long)]
    pub no_wait: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayeringArg {
    Single,
    Nested,
}

impl From<LayeringArg> for RetryLayering {
    fn from(arg: LayeringArg) -> Self {
        match arg {
            LayeringArg::Single => RetryLayering::Single,
            LayeringArg::Nested => RetryLayering::Nested,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineArg {
    Blocking,
    Async,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Synchronized,
    ElementNotFound,
    Fatal,
    Cancelled,
}

#[derive(Clone, Debug, Serialize)]
pub struct SimulationReport {
    pub engine: EngineArg,
    pub layering: LayeringArg,
    pub max_retries: u32,
    pub reload_range: u32,
    pub lookups: u32,
    pub actions: u32,
    pub sleeps: u32,
    pub reloads: u32,
    pub outcome: Outcome,
    pub handle: Option<String>,
    pub error: Option<String>,
}

pub async fn cmd_simulate(
    args: SimulateArgs,
    ctx: &CliContext,
    format: OutputFormat,
) -> Result<()> {
    let report = simulate(&args, ctx).await?;
    info!(outcome = ?report.outcome, lookups = report.lookups, "simulation finished");
    print_structured(&format, &report, |r| {
        match &r.handle {
            Some(handle) => println!("Outcome: {:?} ({})", r.outcome, handle),
            None => println!("Outcome: {:?}", r.outcome),
        }
        if let Some(error) = &r.error {
            println!("  error: {}", error);
        }
        println!(
            "  engine={:?} layering={:?} max.retries={} reload.range={}",
            r.engine, r.layering, r.max_retries, r.reload_range
        );
        println!(
            "  lookups={} actions={} sleeps={} reloads={}",
            r.lookups, r.actions, r.sleeps, r.reloads
        );
    })
}

/// Drive a scripted testable through the selected engine and count what the
/// engine did.
///
/// The blocking engine runs through [`Widget::perform_synchronized_action`].
/// `Widget` only holds blocking collaborators, so the async engine is driven
/// directly with the same locate-then-act operation, and only `Single`
/// layering is available there.
pub async fn simulate(args: &SimulateArgs, ctx: &CliContext) -> Result<SimulationReport> {
    let settings = ctx.settings();
    let policy = RetryPolicy::try_from_counts(
        args.max_retries.unwrap_or(settings.policy.max_retries.get()),
        args.reload_range.unwrap_or(settings.policy.reload_every.get()),
    )?;
    let port = ScriptedTestable::new(args.fail_first, args.fatal_at);
    let reloads = Arc::new(CountingReload::default());

    let (port, sleeps, result) = match args.engine {
        EngineArg::Blocking => {
            let inner: Arc<dyn Waiter> = if args.no_wait {
                Arc::new(NoWait)
            } else {
                Arc::new(settings.waiter())
            };
            let waiter = Arc::new(CountingWaiter::new(inner));
            let widget = Widget::new(port, reloads.clone(), waiter.clone(), policy)
                .with_layering(args.layering.into());
            let (widget, result) = tokio::task::spawn_blocking(move || {
                let result = widget.perform_synchronized_action();
                (widget, result)
            })
            .await?;
            (widget.port().snapshot(), waiter.count(), result)
        }
        EngineArg::Async => {
            if args.layering == LayeringArg::Nested {
                bail!("nested layering is only available with the blocking engine");
            }
            let inner: Arc<dyn AsyncWaiter> = if args.no_wait {
                Arc::new(NoWait)
            } else {
                Arc::new(settings.async_waiter())
            };
            let waiter = CountingAsyncWaiter::new(inner);
            let result = synchronize_async(
                || {
                    let port = &port;
                    async move {
                        let testable = port.locate()?;
                        port.act(&testable)?;
                        Ok::<_, TestableError>(testable)
                    }
                },
                AsyncSyncDeps::new(&policy, &waiter, reloads.as_ref()),
            )
            .await;
            (port.snapshot(), waiter.count(), result)
        }
    };

    let (outcome, handle, error) = describe(result);
    Ok(SimulationReport {
        engine: args.engine,
        layering: args.layering,
        max_retries: policy.max_retries.get(),
        reload_range: policy.reload_every.get(),
        lookups: port.0,
        actions: port.1,
        sleeps,
        reloads: reloads.count(),
        outcome,
        handle,
        error,
    })
}

fn describe(result: Result<String, SyncError>) -> (Outcome, Option<String>, Option<String>) {
    match result {
        Ok(handle) => (Outcome::Synchronized, Some(handle), None),
        Err(err) => {
            let outcome = match err {
                SyncError::ElementNotFound { .. } => Outcome::ElementNotFound,
                SyncError::Fatal { .. } => Outcome::Fatal,
                SyncError::Cancelled { .. } => Outcome::Cancelled,
            };
            let message = match err.source() {
                Some(cause) => format!("{}: {}", err, cause),
                None => err.to_string(),
            };
            (outcome, None, Some(message))
        }
    }
}

/// Testable that stays hidden for the first `fail_first` lookups.
struct ScriptedTestable {
    fail_first: u32,
    fatal_at: Option<u32>,
    lookups: AtomicU32,
    actions: AtomicU32,
}

impl ScriptedTestable {
    fn new(fail_first: u32, fatal_at: Option<u32>) -> Self {
        Self {
            fail_first,
            fatal_at,
            lookups: AtomicU32::new(0),
            actions: AtomicU32::new(0),
        }
    }

    fn snapshot(&self) -> (u32, u32) {
        (
            self.lookups.load(Ordering::SeqCst),
            self.actions.load(Ordering::SeqCst),
        )
    }
}

impl TestablePort for ScriptedTestable {
    type Testable = String;

    fn locate(&self) -> Result<String, TestableError> {
        let n = self.lookups.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fatal_at == Some(n) {
            return Err(TestableError::fatal(format!("lookup {n} hit a detached element")));
        }
        if n <= self.fail_first {
            return Err(TestableError::not_ready(format!("lookup {n}: element not rendered")));
        }
        Ok(format!("testable#{n}"))
    }

    fn act(&self, _testable: &String) -> Result<(), TestableError> {
        self.actions.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct CountingWaiter {
    inner: Arc<dyn Waiter>,
    count: AtomicU32,
}

impl CountingWaiter {
    fn new(inner: Arc<dyn Waiter>) -> Self {
        Self {
            inner,
            count: AtomicU32::new(0),
        }
    }

    fn count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }
}

impl Waiter for CountingWaiter {
    fn sleep(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.inner.sleep();
    }
}

struct CountingAsyncWaiter {
    inner: Arc<dyn AsyncWaiter>,
    count: AtomicU32,
}

impl CountingAsyncWaiter {
    fn new(inner: Arc<dyn AsyncWaiter>) -> Self {
        Self {
            inner,
            count: AtomicU32::new(0),
        }
    }

    fn count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AsyncWaiter for CountingAsyncWaiter {
    async fn sleep(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.inner.sleep().await;
    }
}

#[derive(Default)]
struct CountingReload(AtomicU32);

impl CountingReload {
    fn count(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }
}

impl Reloadable for CountingReload {
    fn reload(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AsyncReloadable for CountingReload {
    async fn reload(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}
