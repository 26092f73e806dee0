//! Integration tests for HTML table rendering
//!
//! Rows arrive as decoded service JSON, so these tests build them the same way.

use planview_core::{PlanResponse, Renderer, Row};
use planview_render::TableRenderer;
use pretty_assertions::assert_eq;
use serde_json::json;

fn rows(value: serde_json::Value) -> Vec<Row> {
    serde_json::from_value(value).unwrap()
}

fn count(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}

#[test]
fn n_rows_give_n_body_rows_and_one_header_per_key() {
    for n in [1, 2, 7] {
        let data: Vec<Row> = (0..n)
            .map(|i| Row::new().with("a", i).with("b", format!("row {i}")))
            .collect();
        let html = TableRenderer::new("Tasks Breakdown").render(&data).unwrap();

        assert_eq!(count(&html, "<th>"), 2);
        assert!(html.contains("<th>A</th><th>B</th>"));
        // One header row plus n body rows
        assert_eq!(count(&html, "<tr>"), n + 1);
        assert_eq!(count(&html, "<td>"), 2 * n);
    }
}

#[test]
fn headers_follow_first_row_key_order() {
    let data = rows(json!([
        {"task_name": "Design", "estimated_time_hours": 40, "required_resources": ["Alice"]}
    ]));
    let html = TableRenderer::new("Tasks Breakdown").render(&data).unwrap();
    let name = html.find("<th>Task Name</th>").unwrap();
    let hours = html.find("<th>Estimated Time Hours</th>").unwrap();
    let resources = html.find("<th>Required Resources</th>").unwrap();
    assert!(name < hours && hours < resources);
}

#[test]
fn empty_rows_emit_no_table() {
    let renderer = TableRenderer::new("Milestones");
    assert_eq!(renderer.render(&[]).unwrap(), "");
    assert!(!renderer.render_rows(None).unwrap().contains("<table"));
}

#[test]
fn list_cell_has_one_item_per_element_in_order() {
    let data = rows(json!([
        {"Milestone": "Core Development", "Tasks": ["API", "UI", "Reports", "Billing"]}
    ]));
    let html = TableRenderer::new("Milestones").render(&data).unwrap();
    assert_eq!(count(&html, "<li>"), 4);
    assert!(html.contains("<li>API</li><li>UI</li><li>Reports</li><li>Billing</li>"));
}

#[test]
fn line_breaks_become_br_markers() {
    let data = rows(json!([{"notes": "first\nsecond\nthird"}]));
    let html = TableRenderer::new("Notes").render(&data).unwrap();
    assert!(html.contains("<td>first<br>second<br>third</td>"));
}

#[test]
fn title_is_rendered_as_heading() {
    let data = rows(json!([{"a": 1}]));
    let html = TableRenderer::new("Tasks Breakdown").render(&data).unwrap();
    assert!(html.contains("<h3>Tasks Breakdown</h3>"));
    assert!(html.contains("<table class=\"table table-striped\">"));
}

#[test]
fn ragged_rows_are_padded_by_default() {
    let data = rows(json!([
        {"a": 1, "b": 2},
        {"a": 3}
    ]));
    let html = TableRenderer::new("T").render(&data).unwrap();
    assert!(html.contains("<tr><td>3</td><td></td></tr>"));
}

#[test]
fn service_response_tables() {
    let response: PlanResponse = serde_json::from_value(json!({
        "success": true,
        "tasks": [
            {"Task Name": "Kickoff", "Estimated Hours": 40, "Assigned To": "Maria"}
        ],
        "milestones": [
            {"Milestone": "Initial Setup", "Tasks": ["Kickoff"]}
        ],
        "gantt_chart": []
    }))
    .unwrap();

    let tasks = TableRenderer::new("Tasks Breakdown")
        .render_rows(response.tasks.as_deref())
        .unwrap();
    assert!(tasks.contains("<td>Kickoff</td><td>40</td><td>Maria</td>"));

    let milestones = TableRenderer::new("Milestones")
        .render_rows(response.milestones.as_deref())
        .unwrap();
    assert!(milestones.contains("<ul class=\"mb-0\"><li>Kickoff</li></ul>"));
}
