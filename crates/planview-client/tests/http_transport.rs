//! HTTP transport tests against a local stub endpoint
//!
//! The stub accepts one connection, captures the raw request and answers
//! with a canned status line and body.

use planview_client::{
    Container, FormController, HtmlDocument, HttpTransport, PlanTransport, SubmitOutcome,
};
use planview_core::{FormFields, PlanRequest, TransportError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve one canned response; the handle yields the raw request text
async fn stub_endpoint(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/generate-plan", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (url, handle)
}

/// Read headers plus a Content-Length body
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buffer);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buffer.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Direct connection, ignoring any proxy configured in the environment
fn transport(url: String) -> HttpTransport {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpTransport::with_client(client, url)
}

fn request() -> PlanRequest {
    PlanRequest::from(&FormFields {
        project_name: "Launch".into(),
        team_members: "Alice\nBob".into(),
        project_start_date: "2024-01-01".into(),
        project_end_date: "2024-02-01".into(),
        ..FormFields::default()
    })
}

#[tokio::test]
async fn posts_json_and_decodes_success() {
    let (url, server) = stub_endpoint(
        "200 OK",
        r#"{"success": true, "tasks": [{"Task Name": "Kickoff"}], "milestones": [], "gantt_chart": []}"#,
    )
    .await;

    let response = transport(url).send(&request()).await.unwrap();
    assert!(response.success);
    assert_eq!(response.tasks.unwrap().len(), 1);

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /generate-plan HTTP/1.1"));
    assert!(raw.to_ascii_lowercase().contains("content-type: application/json"));
    assert!(raw.contains(r#""team_members":["Alice","Bob"]"#));
    assert!(raw.contains(r#""project_name":"Launch""#));
}

#[tokio::test]
async fn error_status_body_is_still_decoded() {
    let (url, server) = stub_endpoint(
        "400 BAD REQUEST",
        r#"{"success": false, "error": "No tasks were generated"}"#,
    )
    .await;

    let response = transport(url).send(&request()).await.unwrap();
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("No tasks were generated"));
    server.await.unwrap();
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let (url, server) = stub_endpoint("500 INTERNAL SERVER ERROR", "<html>oops</html>").await;

    let err = transport(url).send(&request()).await.unwrap_err();
    assert!(matches!(err, TransportError::Decode(ref msg) if msg.contains("HTTP 500")));
    server.await.unwrap();
}

#[tokio::test]
async fn unreachable_endpoint_is_a_request_error() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/generate-plan", listener.local_addr().unwrap());
    drop(listener);

    let err = transport(url).send(&request()).await.unwrap_err();
    assert!(matches!(err, TransportError::Request(_)));
}

#[tokio::test]
async fn controller_over_http_clears_busy_on_every_outcome() {
    let cases = [
        ("200 OK", r#"{"success": true, "tasks": [], "milestones": [], "gantt_chart": []}"#),
        ("400 BAD REQUEST", r#"{"success": false, "error": "bad dates"}"#),
        ("502 BAD GATEWAY", "not json"),
    ];

    let mut outcomes = Vec::new();
    for (status, body) in cases {
        let (url, server) = stub_endpoint(status, body).await;
        let controller = FormController::new(transport(url));
        let mut page = HtmlDocument::new(FormFields::default());

        outcomes.push(controller.submit(&mut page).await);

        assert!(!page.is_busy());
        assert!(page.is_submit_enabled());
        server.await.unwrap();

        if outcomes.len() == 1 {
            assert!(page
                .content(Container::GanttChart)
                .contains("No timeline data available"));
        }
    }

    assert_eq!(outcomes[0], SubmitOutcome::Rendered);
    assert_eq!(outcomes[1], SubmitOutcome::Rejected("bad dates".into()));
    assert!(matches!(outcomes[2], SubmitOutcome::Failed(_)));
}
