//! Widget synchronization layer
//!
//! Widgets under test are backed by platform objects ("testables") that may not
//! be rendered yet when a test touches them. This crate provides:
//! - a bounded retry-with-reload engine that polls a locate-then-act operation
//! - capability traits for lookup/action, container reload and waiting
//! - a small widget catalog (tables, tabbed sections) built on the engine
//! - settings loading for the retry tunables

pub mod engine;
pub mod errors;
pub mod policy;
pub mod ports;
pub mod settings;
mod waiting;
pub mod widget;
pub mod widgets;

pub use engine::{synchronize, synchronize_async, AsyncSyncDeps, SyncDeps};
pub use errors::{ConfigurationError, SyncError, TestableError};
pub use policy::RetryPolicy;
pub use ports::{
    AsyncReloadable, AsyncWaiter, ContainerPort, Reloadable, TablePort, TestablePort, Waiter,
};
pub use settings::Settings;
pub use waiting::{FixedDelayWaiter, NoReload, NoWait, TokioWaiter};
pub use widget::{RetryLayering, Widget};
pub use widgets::{Clickable, TabbedSection, Table};
