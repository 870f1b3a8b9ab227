use std::sync::Arc;

use tracing::warn;

use crate::errors::SyncError;
use crate::policy::RetryPolicy;
use crate::ports::{Reloadable, TablePort, Waiter};
use crate::widget::Widget;
use crate::widgets::Clickable;

/// A table; every accessor re-locates the table before reading it.
pub struct Table<P: TablePort> {
    widget: Widget<P>,
}

impl<P: TablePort> Table<P> {
    pub fn new(
        port: P,
        container: Arc<dyn Reloadable>,
        waiter: Arc<dyn Waiter>,
        policy: RetryPolicy,
    ) -> Self {
        Self::from_widget(Widget::new(port, container, waiter, policy))
    }

    pub fn from_widget(widget: Widget<P>) -> Self {
        Self { widget }
    }

    pub fn widget(&self) -> &Widget<P> {
        &self.widget
    }

    pub fn row_count(&self) -> Result<usize, SyncError> {
        self.widget.synchronize_on(|port, t| port.row_count(t))
    }

    pub fn column_count(&self) -> Result<usize, SyncError> {
        self.widget.synchronize_on(|port, t| port.column_count(t))
    }

    /// Value of the cell at `(row, col)`.
    pub fn cell_value(&self, row: usize, col: usize) -> Result<String, SyncError> {
        self.widget.synchronize_on(|port, t| port.cell_value(t, row, col))
    }
}

impl<P: TablePort> Clickable for Table<P> {
    fn click(&self) -> Result<(), SyncError> {
        self.widget.perform_synchronized_action().map(|_| ())
    }
}

impl<P: TablePort> Reloadable for Table<P> {
    fn reload(&self) {
        if let Err(err) = self.widget.synchronize_on(|port, t| port.refresh(t)) {
            warn!(error = %err, "table reload failed");
        }
    }
}
