use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::TestableError;

/// Platform lookup and action for one kind of UI element.
pub trait TestablePort: Send + Sync {
    /// Opaque platform handle; the engine only passes it around.
    type Testable: Clone + Debug + Send + Sync;

    fn locate(&self) -> Result<Self::Testable, TestableError>;
    fn act(&self, testable: &Self::Testable) -> Result<(), TestableError>;
}

/// An element that contains other elements and can refresh their references.
pub trait ContainerPort: TestablePort {
    fn refresh(&self, testable: &Self::Testable) -> Result<(), TestableError>;
}

pub trait TablePort: ContainerPort {
    fn row_count(&self, testable: &Self::Testable) -> Result<usize, TestableError>;
    fn column_count(&self, testable: &Self::Testable) -> Result<usize, TestableError>;
    fn cell_value(
        &self,
        testable: &Self::Testable,
        row: usize,
        col: usize,
    ) -> Result<String, TestableError>;
}

/// Recovery hook invoked by the engine every `reload_every` failures.
pub trait Reloadable: Send + Sync {
    fn reload(&self);
}

/// Pause between two attempts; blocks the calling thread.
pub trait Waiter: Send + Sync {
    fn sleep(&self);
}

#[async_trait]
pub trait AsyncReloadable: Send + Sync {
    async fn reload(&self);
}

#[async_trait]
pub trait AsyncWaiter: Send + Sync {
    async fn sleep(&self);
}
