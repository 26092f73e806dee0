//! Submission cycle tests against stub endpoints
//!
//! Every outcome (plan rendered, plan rejected, exchange failed) must leave
//! the busy indicator cleared and the submit control enabled.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use planview_client::{
    Container, FormController, HtmlDocument, Page, PlanTransport, SubmitOutcome,
    GENERIC_FAILURE_MESSAGE,
};
use planview_core::{FormFields, PlanRequest, PlanResponse, TransportError};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::Notify;

/// Page that records every busy-indicator change
#[derive(Default)]
struct RecordingPage {
    document: HtmlDocument,
    busy_events: Vec<bool>,
    submit_events: Vec<bool>,
}

impl RecordingPage {
    fn with_fields(fields: FormFields) -> Self {
        Self {
            document: HtmlDocument::new(fields),
            ..Self::default()
        }
    }

    fn assert_settled(&self) {
        assert_eq!(self.busy_events, vec![true, false]);
        assert_eq!(self.submit_events, vec![false, true]);
        assert!(!self.document.is_busy());
        assert!(self.document.is_submit_enabled());
    }
}

impl Page for RecordingPage {
    fn form_fields(&self) -> FormFields {
        self.document.form_fields()
    }

    fn set_content(&mut self, container: Container, html: String) {
        self.document.set_content(container, html);
    }

    fn set_busy(&mut self, busy: bool) {
        self.busy_events.push(busy);
        self.document.set_busy(busy);
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_events.push(enabled);
        self.document.set_submit_enabled(enabled);
    }

    fn notify(&mut self, message: &str) {
        self.document.notify(message);
    }
}

/// Answers every request with the same response and keeps the last request
struct CannedTransport {
    response: PlanResponse,
    last_request: Mutex<Option<PlanRequest>>,
}

impl CannedTransport {
    fn new(response: PlanResponse) -> Self {
        Self {
            response,
            last_request: Mutex::new(None),
        }
    }
}

#[async_trait]
impl PlanTransport for CannedTransport {
    async fn send(&self, request: &PlanRequest) -> Result<PlanResponse, TransportError> {
        *self.last_request.lock().unwrap() = Some(request.clone());
        Ok(self.response.clone())
    }
}

/// Fails every request
struct BrokenTransport(fn() -> TransportError);

#[async_trait]
impl PlanTransport for BrokenTransport {
    async fn send(&self, _request: &PlanRequest) -> Result<PlanResponse, TransportError> {
        Err((self.0)())
    }
}

/// Holds every request until released
struct GatedTransport {
    gate: Arc<Notify>,
}

#[async_trait]
impl PlanTransport for GatedTransport {
    async fn send(&self, _request: &PlanRequest) -> Result<PlanResponse, TransportError> {
        self.gate.notified().await;
        Ok(PlanResponse::failure("late"))
    }
}

fn form() -> FormFields {
    FormFields {
        project_name: "CRM Migration".into(),
        industry: "Retail".into(),
        project_objectives: "Move customer data to the new CRM".into(),
        team_members: "Maria (PM)\nLuca (Architect)\nMarco (Dev)".into(),
        project_requirements: "Data migration\nSSO\n".into(),
        project_start_date: "2024-01-01".into(),
        project_end_date: "2024-03-31".into(),
    }
}

fn successful_plan() -> PlanResponse {
    serde_json::from_value(json!({
        "success": true,
        "tasks": [
            {"Task Name": "Data migration", "Estimated Hours": 40, "Assigned To": "Marco"},
            {"Task Name": "SSO", "Estimated Hours": 40, "Assigned To": "Luca"}
        ],
        "milestones": [
            {"Milestone": "Initial Setup", "Tasks": ["Data migration", "SSO"]}
        ],
        "gantt_chart": [
            {"Task": "Data migration", "Start": "2024-01-01", "Finish": "2024-01-31", "Resource": "Marco"},
            {"Task": "SSO", "Start": "2024-02-01", "Finish": "2024-02-29", "Resource": "Luca"}
        ]
    }))
    .unwrap()
}

#[tokio::test]
async fn success_renders_all_containers_and_clears_busy() {
    let controller = FormController::new(CannedTransport::new(successful_plan()));
    let mut page = RecordingPage::with_fields(form());

    let outcome = controller.submit(&mut page).await;

    assert_eq!(outcome, SubmitOutcome::Rendered);
    page.assert_settled();
    let tasks = page.document.content(Container::TasksTable);
    assert!(tasks.contains("<h3>Tasks Breakdown</h3>"));
    assert!(tasks.contains("<th>Task Name</th><th>Estimated Hours</th><th>Assigned To</th>"));
    let milestones = page.document.content(Container::MilestonesTable);
    assert!(milestones.contains("<h3>Milestones</h3>"));
    assert!(milestones.contains("<li>Data migration</li><li>SSO</li>"));
    assert!(page.document.content(Container::GanttChart).contains("<svg"));
    assert!(page.document.notifications().is_empty());

    let last = controller.take_last_response().unwrap();
    assert_eq!(last.tasks.map(|rows| rows.len()), Some(2));
    assert!(controller.take_last_response().is_none());
}

#[tokio::test]
async fn request_is_built_from_form_lines() {
    let controller = FormController::new(CannedTransport::new(successful_plan()));
    let mut page = RecordingPage::with_fields(form());
    controller.submit(&mut page).await;

    let request = controller
        .transport()
        .last_request
        .lock()
        .unwrap()
        .clone()
        .unwrap();
    assert_eq!(request.project_name, "CRM Migration");
    assert_eq!(
        request.team_members,
        vec!["Maria (PM)", "Luca (Architect)", "Marco (Dev)"]
    );
    assert_eq!(request.project_requirements, vec!["Data migration", "SSO", ""]);
    assert_eq!(request.project_end_date, "2024-03-31");
}

#[tokio::test]
async fn rejection_notifies_verbatim_and_clears_busy() {
    let controller = FormController::new(CannedTransport::new(PlanResponse::failure(
        "Failed to process crew output",
    )));
    let mut page = RecordingPage::with_fields(form());

    let outcome = controller.submit(&mut page).await;

    assert_eq!(
        outcome,
        SubmitOutcome::Rejected("Failed to process crew output".into())
    );
    page.assert_settled();
    assert_eq!(
        page.document.notifications(),
        ["Error generating project plan: Failed to process crew output".to_string()]
    );
    assert_eq!(page.document.content(Container::TasksTable), "");
}

#[tokio::test]
async fn transport_failure_notifies_generic_and_clears_busy() {
    let controller = FormController::new(BrokenTransport(|| {
        TransportError::Request("connection refused".into())
    }));
    let mut page = RecordingPage::with_fields(form());

    let outcome = controller.submit(&mut page).await;

    assert!(matches!(outcome, SubmitOutcome::Failed(ref msg) if msg.contains("connection refused")));
    page.assert_settled();
    assert_eq!(
        page.document.notifications(),
        [GENERIC_FAILURE_MESSAGE.to_string()]
    );
}

#[tokio::test]
async fn decode_failure_is_a_transport_failure() {
    let controller = FormController::new(BrokenTransport(|| {
        TransportError::Decode("expected value at line 1 column 1".into())
    }));
    let mut page = RecordingPage::with_fields(form());

    let outcome = controller.submit(&mut page).await;

    assert!(matches!(outcome, SubmitOutcome::Failed(_)));
    page.assert_settled();
}

#[tokio::test]
async fn empty_timeline_renders_placeholder() {
    let mut plan = successful_plan();
    plan.gantt_chart = None;
    let controller = FormController::new(CannedTransport::new(plan));
    let mut page = RecordingPage::with_fields(form());

    assert_eq!(controller.submit(&mut page).await, SubmitOutcome::Rendered);
    assert!(page
        .document
        .content(Container::GanttChart)
        .contains("No timeline data available"));
}

#[tokio::test]
async fn overlapping_submission_is_ignored() {
    let gate = Arc::new(Notify::new());
    let controller = FormController::new(GatedTransport { gate: gate.clone() });
    let mut first_page = RecordingPage::with_fields(form());
    let mut second_page = RecordingPage::with_fields(form());

    let first = {
        let first = controller.submit(&mut first_page);
        tokio::pin!(first);

        // Drive the first submission until it parks on the gate
        tokio::select! {
            biased;
            _ = &mut first => panic!("first submission finished before the gate opened"),
            () = tokio::task::yield_now() => {}
        }
        assert!(controller.is_in_flight());

        let second = controller.submit(&mut second_page).await;
        assert_eq!(second, SubmitOutcome::Ignored);

        gate.notify_one();
        first.await
    };

    assert_eq!(first, SubmitOutcome::Rejected("late".into()));
    first_page.assert_settled();
    assert!(second_page.busy_events.is_empty());
    assert!(!controller.is_in_flight());
}
