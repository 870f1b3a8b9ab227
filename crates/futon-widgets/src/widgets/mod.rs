//! Concrete widget kinds built on [`Widget`](crate::widget::Widget)

mod table;
mod tabbed_section;

pub use tabbed_section::TabbedSection;
pub use table::Table;

use crate::errors::SyncError;

/// Widgets that can be clicked once their testable is ready.
pub trait Clickable {
    fn click(&self) -> Result<(), SyncError>;
}
