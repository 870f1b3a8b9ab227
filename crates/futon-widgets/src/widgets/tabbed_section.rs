use std::sync::Arc;

use tracing::warn;

use crate::errors::SyncError;
use crate::policy::RetryPolicy;
use crate::ports::{ContainerPort, Reloadable, Waiter};
use crate::widget::Widget;
use crate::widgets::Clickable;

/// A section inside a tab. Clicking it selects the tab; reloading it refreshes
/// the widgets it contains.
pub struct TabbedSection<P: ContainerPort> {
    title: String,
    widget: Widget<P>,
}

impl<P: ContainerPort> TabbedSection<P> {
    pub fn new(
        title: impl Into<String>,
        port: P,
        container: Arc<dyn Reloadable>,
        waiter: Arc<dyn Waiter>,
        policy: RetryPolicy,
    ) -> Self {
        Self::from_widget(title, Widget::new(port, container, waiter, policy))
    }

    pub fn from_widget(title: impl Into<String>, widget: Widget<P>) -> Self {
        Self {
            title: title.into(),
            widget,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn widget(&self) -> &Widget<P> {
        &self.widget
    }
}

impl<P: ContainerPort> Clickable for TabbedSection<P> {
    fn click(&self) -> Result<(), SyncError> {
        self.widget.perform_synchronized_action().map(|_| ())
    }
}

impl<P: ContainerPort> Reloadable for TabbedSection<P> {
    fn reload(&self) {
        if let Err(err) = self.widget.synchronize_on(|port, t| port.refresh(t)) {
            warn!(tab = %self.title, error = %err, "tab reload failed");
        }
    }
}
