//! Host page abstraction
//!
//! A page exposes the form inputs, three output containers, a busy
//! indicator, the submit control and blocking notifications. Renderers never
//! look elements up by name; they are handed a [`Container`].

use std::ops::{Deref, DerefMut};

use planview_core::FormFields;

/// Output containers on the page
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Container {
    TasksTable,
    MilestonesTable,
    GanttChart,
}

impl Container {
    pub const ALL: [Container; 3] = [
        Container::TasksTable,
        Container::MilestonesTable,
        Container::GanttChart,
    ];

    /// Element id of the container in the HTML page
    pub fn element_id(self) -> &'static str {
        match self {
            Self::TasksTable => "tasksTable",
            Self::MilestonesTable => "milestonesTable",
            Self::GanttChart => "ganttChart",
        }
    }
}

/// The document a controller reads from and writes to
pub trait Page {
    /// Current values of the form inputs
    fn form_fields(&self) -> FormFields;

    /// Replace a container's HTML content
    fn set_content(&mut self, container: Container, html: String);

    /// Show or hide the busy indicator
    fn set_busy(&mut self, busy: bool);

    /// Enable or disable the submit control
    fn set_submit_enabled(&mut self, enabled: bool);

    /// Show a blocking notification
    fn notify(&mut self, message: &str);
}

/// Shows the busy indicator and disables submit for as long as it lives.
///
/// Dropping the guard hides the indicator and re-enables submit, whichever
/// way the enclosing scope is left.
pub struct BusyGuard<'a, P: Page + ?Sized> {
    page: &'a mut P,
}

impl<'a, P: Page + ?Sized> BusyGuard<'a, P> {
    pub fn show(page: &'a mut P) -> Self {
        page.set_busy(true);
        page.set_submit_enabled(false);
        Self { page }
    }
}

impl<P: Page + ?Sized> Deref for BusyGuard<'_, P> {
    type Target = P;

    fn deref(&self) -> &P {
        self.page
    }
}

impl<P: Page + ?Sized> DerefMut for BusyGuard<'_, P> {
    fn deref_mut(&mut self) -> &mut P {
        self.page
    }
}

impl<P: Page + ?Sized> Drop for BusyGuard<'_, P> {
    fn drop(&mut self) {
        self.page.set_busy(false);
        self.page.set_submit_enabled(true);
    }
}
