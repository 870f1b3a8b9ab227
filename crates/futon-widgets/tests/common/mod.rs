#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};

use futon_widgets::{Reloadable, TestableError, Waiter};

/// Counts sleeps or reloads.
#[derive(Default)]
pub struct Tally(AtomicU32);

impl Tally {
    pub fn count(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

impl Waiter for Tally {
    fn sleep(&self) {
        self.bump();
    }
}

impl Reloadable for Tally {
    fn reload(&self) {
        self.bump();
    }
}

/// Operation that fails with numbered `NotReady` errors before succeeding on
/// attempt `succeed_on` (1-indexed). `None` never succeeds.
pub struct Script {
    succeed_on: Option<u32>,
    calls: AtomicU32,
}

impl Script {
    pub fn succeeding_on(attempt: u32) -> Self {
        Self {
            succeed_on: Some(attempt),
            calls: AtomicU32::new(0),
        }
    }

    pub fn always_failing() -> Self {
        Self {
            succeed_on: None,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn run(&self) -> Result<String, TestableError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.succeed_on {
            Some(k) if n >= k => Ok(format!("handle-{n}")),
            _ => Err(TestableError::not_ready(format!("failure {n}"))),
        }
    }
}
