//! # planview-client
//!
//! Submits project-planning forms to the planning service and renders the
//! answer into a page.
//!
//! This crate provides:
//! - [`Page`]: the host document, addressed through [`Container`] handles
//! - [`FormController`]: one submit/response/render cycle per call
//! - [`PlanView`]: renders a response into a page without any network
//! - [`HttpTransport`]: the reqwest-backed [`PlanTransport`]
//! - [`HtmlDocument`]: an in-memory page that serializes to standalone HTML
//!
//! ## Example
//!
//! ```rust,ignore
//! use planview_client::{FormController, HtmlDocument, HttpTransport, DEFAULT_ENDPOINT};
//!
//! let controller = FormController::new(HttpTransport::new(DEFAULT_ENDPOINT));
//! let mut page = HtmlDocument::new(fields);
//! let outcome = controller.submit(&mut page).await;
//! std::fs::write("plan.html", page.to_html())?;
//! ```

pub mod controller;
pub mod document;
pub mod page;
pub mod transport;

pub use controller::{FormController, PlanView, SubmitOutcome, GENERIC_FAILURE_MESSAGE};
pub use document::HtmlDocument;
pub use page::{BusyGuard, Container, Page};
pub use transport::{HttpTransport, PlanTransport, DEFAULT_ENDPOINT};
