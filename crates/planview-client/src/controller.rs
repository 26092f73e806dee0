//! Form submission cycle
//!
//! [`FormController::submit`] runs one cycle: read the form, post the
//! request, render the answer. Outcomes fall in two failure tiers:
//! - the service answered `success: false`: its message is shown verbatim
//! - the exchange or the rendering broke: the failure is logged and a
//!   generic message is shown
//!
//! Neither tier retries. The busy indicator is cleared on every path.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use planview_core::{PlanRequest, PlanResponse, RenderError, RowPolicy};
use planview_render::{GanttRenderer, TableRenderer};

use crate::page::{BusyGuard, Container, Page};
use crate::transport::PlanTransport;

/// Shown when the exchange fails or the response cannot be rendered
pub const GENERIC_FAILURE_MESSAGE: &str = "Error generating project plan. Please try again.";

/// Result of one submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The plan was rendered into the page
    Rendered,
    /// The service reported failure with this message
    Rejected(String),
    /// Transport, decoding or rendering failed
    Failed(String),
    /// Another submission was still in flight
    Ignored,
}

impl SubmitOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Rendered)
    }
}

/// Renders a plan response into a page
#[derive(Clone, Debug)]
pub struct PlanView {
    pub tasks: TableRenderer,
    pub milestones: TableRenderer,
    pub gantt: GanttRenderer,
}

impl Default for PlanView {
    fn default() -> Self {
        Self {
            tasks: TableRenderer::new("Tasks Breakdown"),
            milestones: TableRenderer::new("Milestones"),
            gantt: GanttRenderer::new(),
        }
    }
}

impl PlanView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a row policy to both tables
    pub fn row_policy(mut self, policy: RowPolicy) -> Self {
        self.tasks = self.tasks.policy(policy);
        self.milestones = self.milestones.policy(policy);
        self
    }

    /// Show a response in the page
    pub fn apply<P: Page + ?Sized>(&self, page: &mut P, response: &PlanResponse) -> SubmitOutcome {
        if !response.success {
            let message = response
                .error
                .clone()
                .unwrap_or_else(|| "Unknown error".to_string());
            tracing::warn!("Planning service rejected the request: {}", message);
            page.notify(&format!("Error generating project plan: {}", message));
            return SubmitOutcome::Rejected(message);
        }

        match self.render_plan(page, response) {
            Ok(()) => SubmitOutcome::Rendered,
            Err(e) => {
                tracing::error!("Error rendering project plan: {}", e);
                page.notify(GENERIC_FAILURE_MESSAGE);
                SubmitOutcome::Failed(e.to_string())
            }
        }
    }

    fn render_plan<P: Page + ?Sized>(
        &self,
        page: &mut P,
        response: &PlanResponse,
    ) -> Result<(), RenderError> {
        // Containers are only touched once every fragment is ready
        let tasks = self.tasks.render_rows(response.tasks.as_deref())?;
        let milestones = self.milestones.render_rows(response.milestones.as_deref())?;
        let chart = self.gantt.render_fragment(response.gantt_chart.as_deref());

        page.set_content(Container::TasksTable, tasks);
        page.set_content(Container::MilestonesTable, milestones);
        page.set_content(Container::GanttChart, chart);

        Ok(())
    }
}

/// Drives the submit/response/render cycle for one form
pub struct FormController<T: PlanTransport> {
    transport: T,
    view: PlanView,
    in_flight: AtomicBool,
    last_response: Mutex<Option<PlanResponse>>,
}

impl<T: PlanTransport> FormController<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            view: PlanView::default(),
            in_flight: AtomicBool::new(false),
            last_response: Mutex::new(None),
        }
    }

    /// Replace the renderers
    pub fn with_view(mut self, view: PlanView) -> Self {
        self.view = view;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Whether a submission is currently pending
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Take the response of the most recent completed exchange
    pub fn take_last_response(&self) -> Option<PlanResponse> {
        self.last_response
            .lock()
            .map(|mut last| last.take())
            .unwrap_or_default()
    }

    /// Handle one form submission.
    ///
    /// A submission arriving while another is pending is refused with
    /// [`SubmitOutcome::Ignored`].
    pub async fn submit<P: Page + ?Sized>(&self, page: &mut P) -> SubmitOutcome {
        let Some(_flight) = InFlight::acquire(&self.in_flight) else {
            tracing::warn!("Ignoring submission while a request is in flight");
            return SubmitOutcome::Ignored;
        };

        let mut page = BusyGuard::show(page);
        let request = PlanRequest::from(&page.form_fields());

        tracing::info!(
            project = %request.project_name,
            team = request.team_members.len(),
            requirements = request.project_requirements.len(),
            "Submitting project plan request"
        );

        match self.transport.send(&request).await {
            Ok(response) => {
                let outcome = self.view.apply(&mut *page, &response);
                if let Ok(mut last) = self.last_response.lock() {
                    *last = Some(response);
                }
                outcome
            }
            Err(e) => {
                tracing::error!("Error: {}", e);
                page.notify(GENERIC_FAILURE_MESSAGE);
                SubmitOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Holds the in-flight flag until dropped
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
