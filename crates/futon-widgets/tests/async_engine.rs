use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futon_widgets::{
    synchronize_async, AsyncReloadable, AsyncSyncDeps, AsyncWaiter, NoReload, NoWait,
    RetryPolicy, SyncError, TestableError, TokioWaiter,
};
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct Tally(AtomicU32);

#[async_trait]
impl AsyncWaiter for Tally {
    async fn sleep(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AsyncReloadable for Tally {
    async fn reload(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn async_engine_matches_blocking_counts() {
    let policy = RetryPolicy::try_from_counts(3, 2).unwrap();
    let sleeps = Tally::default();
    let reloads = Tally::default();
    let calls = AtomicU32::new(0);

    let result = synchronize_async(
        || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(TestableError::not_ready("tab still loading"))
                } else {
                    Ok(n)
                }
            }
        },
        AsyncSyncDeps::new(&policy, &sleeps, &reloads),
    )
    .await;

    assert_eq!(result.unwrap(), 3);
    assert_eq!(sleeps.0.load(Ordering::SeqCst), 2);
    assert_eq!(reloads.0.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn async_engine_reports_exhaustion() {
    let policy = RetryPolicy::try_from_counts(4, 10).unwrap();
    let waiter = TokioWaiter::new(Duration::from_millis(1));
    let result: Result<(), SyncError> = synchronize_async(
        || async { Err(TestableError::not_ready("never")) },
        AsyncSyncDeps::new(&policy, &waiter, &NoReload),
    )
    .await;
    assert!(matches!(
        result,
        Err(SyncError::ElementNotFound { attempts: 4, .. })
    ));
}

#[tokio::test]
async fn async_engine_stops_on_fatal_failure() {
    let policy = RetryPolicy::try_from_counts(10, 1).unwrap();
    let sleeps = Tally::default();
    let reloads = Tally::default();
    let calls = AtomicU32::new(0);

    let result: Result<(), SyncError> = synchronize_async(
        || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TestableError::fatal("dialog closed")) }
        },
        AsyncSyncDeps::new(&policy, &sleeps, &reloads),
    )
    .await;

    assert!(matches!(
        result,
        Err(SyncError::Fatal {
            attempts: 0,
            source: TestableError::Fatal(_)
        })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(sleeps.0.load(Ordering::SeqCst), 0);
    assert_eq!(reloads.0.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn async_engine_stops_when_operation_reports_cancellation() {
    let policy = RetryPolicy::default();
    let calls = AtomicU32::new(0);

    let result: Result<(), SyncError> = synchronize_async(
        || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n == 3 {
                    Err(TestableError::Cancelled)
                } else {
                    Err(TestableError::not_ready("spinner"))
                }
            }
        },
        AsyncSyncDeps::new(&policy, &NoWait, &NoReload),
    )
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(matches!(
        result,
        Err(SyncError::Cancelled {
            attempts: 2,
            last_error: Some(TestableError::NotReady(_))
        })
    ));
}

#[tokio::test]
async fn async_engine_stops_when_cancelled() {
    let policy = RetryPolicy::default();
    let token = CancellationToken::new();
    let calls = AtomicU32::new(0);

    let result: Result<(), SyncError> = synchronize_async(
        || {
            if calls.fetch_add(1, Ordering::SeqCst) == 4 {
                token.cancel();
            }
            async { Err(TestableError::not_ready("spinner")) }
        },
        AsyncSyncDeps::new(&policy, &NoWait, &NoReload).with_cancel(&token),
    )
    .await;

    assert_eq!(calls.load(Ordering::SeqCst), 5);
    assert!(matches!(result, Err(SyncError::Cancelled { attempts: 5, .. })));
}
