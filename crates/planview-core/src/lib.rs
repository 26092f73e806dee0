//! # planview-core
//!
//! Core data model and traits for the planview project plan client.
//!
//! This crate provides:
//! - Form and wire types: `FormFields`, `PlanRequest`, `PlanResponse`
//! - Table model: `Row`, `CellValue`, `TableSchema`, `RowPolicy`
//! - Timeline model: `GanttRecord`, `GanttEntry`
//! - The `Renderer` trait and error types
//!
//! ## Example
//!
//! ```rust
//! use planview_core::{FormFields, PlanRequest};
//!
//! let fields = FormFields {
//!     project_name: "Website Redesign".into(),
//!     team_members: "Alice (PM)\nBob (Dev)".into(),
//!     ..FormFields::default()
//! };
//! let request = PlanRequest::from(&fields);
//! assert_eq!(request.team_members, vec!["Alice (PM)", "Bob (Dev)"]);
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

// ============================================================================
// Form Input
// ============================================================================

/// Raw form values, exactly as typed into the input fields.
///
/// Team members and requirements are newline-delimited textareas; they are
/// split into sequences only when a [`PlanRequest`] is built.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormFields {
    pub project_name: String,
    pub industry: String,
    pub project_objectives: String,
    pub team_members: String,
    pub project_requirements: String,
    pub project_start_date: String,
    pub project_end_date: String,
}

/// Split a textarea value into one entry per line.
///
/// Empty lines are kept: `""` yields `[""]` and `"a\n"` yields `["a", ""]`.
pub fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(String::from).collect()
}

// ============================================================================
// Wire Types
// ============================================================================

/// Request body sent to the planning endpoint
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub project_name: String,
    pub industry: String,
    pub project_objectives: String,
    pub team_members: Vec<String>,
    pub project_requirements: Vec<String>,
    pub project_start_date: String,
    pub project_end_date: String,
}

impl From<&FormFields> for PlanRequest {
    fn from(fields: &FormFields) -> Self {
        Self {
            project_name: fields.project_name.clone(),
            industry: fields.industry.clone(),
            project_objectives: fields.project_objectives.clone(),
            team_members: split_lines(&fields.team_members),
            project_requirements: split_lines(&fields.project_requirements),
            project_start_date: fields.project_start_date.clone(),
            project_end_date: fields.project_end_date.clone(),
        }
    }
}

/// Response body returned by the planning endpoint
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Row>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub milestones: Option<Vec<Row>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gantt_chart: Option<Vec<GanttRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlanResponse {
    /// Build a failed response carrying an error message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

// ============================================================================
// Table Model
// ============================================================================

/// One table row: an ordered mapping from column key to JSON value.
///
/// Key order is the order the keys appeared on the wire.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Map<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Row {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A typed table cell
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellValue {
    /// A sequence, rendered as a bullet list
    List(Vec<String>),
    /// A string, line breaks preserved
    Text(String),
    /// Numbers, booleans and nested objects in their default text form
    Scalar(String),
    /// Null or missing
    Empty,
}

impl CellValue {
    /// Plain text form, used where markup is not available (spreadsheets, widths)
    pub fn to_plain_text(&self) -> String {
        match self {
            Self::List(items) => items.join(", "),
            Self::Text(text) | Self::Scalar(text) => text.clone(),
            Self::Empty => String::new(),
        }
    }
}

impl From<&Value> for CellValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Array(items) => Self::List(items.iter().map(value_text).collect()),
            Value::String(text) => Self::Text(text.clone()),
            Value::Null => Self::Empty,
            other => Self::Scalar(other.to_string()),
        }
    }
}

/// Default text conversion of a JSON value
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// How rows that disagree with the table schema are handled
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RowPolicy {
    /// Missing columns become empty cells, extra keys are dropped
    #[default]
    Pad,
    /// Any mismatch is an error
    Strict,
}

/// Declared column list of one table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableSchema {
    pub columns: Vec<String>,
}

impl TableSchema {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Derive the schema from the first row's keys, in order.
    ///
    /// Returns `None` for an empty row sequence.
    pub fn from_rows(rows: &[Row]) -> Option<Self> {
        rows.first()
            .map(|first| Self::new(first.keys().map(String::from).collect()))
    }

    /// Conform a row to this schema, returning one cell per column
    pub fn conform(
        &self,
        index: usize,
        row: &Row,
        policy: RowPolicy,
    ) -> Result<Vec<CellValue>, RenderError> {
        let missing: Vec<&str> = self
            .columns
            .iter()
            .map(String::as_str)
            .filter(|column| !row.contains_key(column))
            .collect();
        let extra: Vec<&str> = row
            .keys()
            .filter(|key| !self.columns.iter().any(|column| column == key))
            .collect();

        if !missing.is_empty() || !extra.is_empty() {
            let detail = describe_mismatch(&missing, &extra);
            match policy {
                RowPolicy::Strict => {
                    return Err(RenderError::Schema { row: index, detail });
                }
                RowPolicy::Pad => {
                    tracing::warn!(row = index, "row does not match table columns: {}", detail);
                }
            }
        }

        Ok(self
            .columns
            .iter()
            .map(|column| row.get(column).map_or(CellValue::Empty, CellValue::from))
            .collect())
    }
}

fn describe_mismatch(missing: &[&str], extra: &[&str]) -> String {
    let mut parts = Vec::new();
    if !missing.is_empty() {
        parts.push(format!("missing {}", missing.join(", ")));
    }
    if !extra.is_empty() {
        parts.push(format!("unexpected {}", extra.join(", ")));
    }
    parts.join("; ")
}

// ============================================================================
// Timeline Model
// ============================================================================

/// A raw timeline row as sent by the service
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GanttRecord {
    #[serde(rename = "Task", default, deserialize_with = "lenient_text")]
    pub task: String,
    #[serde(rename = "Start", default, deserialize_with = "lenient_text")]
    pub start: String,
    #[serde(rename = "Finish", default, deserialize_with = "lenient_text")]
    pub finish: String,
    #[serde(rename = "Resource", default, deserialize_with = "lenient_text")]
    pub resource: String,
}

impl GanttRecord {
    pub fn new(
        task: impl Into<String>,
        start: impl Into<String>,
        finish: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            task: task.into(),
            start: start.into(),
            finish: finish.into(),
            resource: resource.into(),
        }
    }
}

/// Accept any JSON value where text is expected; lists are comma-joined
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(", "),
        other => value_text(other),
    })
}

/// A timeline row with parsed instants
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GanttEntry {
    pub task: String,
    pub start: NaiveDateTime,
    pub finish: NaiveDateTime,
    pub resource: String,
}

impl GanttEntry {
    /// Length of the bar in (fractional) days
    pub fn duration_days(&self) -> f64 {
        (self.finish - self.start).num_milliseconds() as f64 / 86_400_000.0
    }
}

impl TryFrom<&GanttRecord> for GanttEntry {
    type Error = RenderError;

    fn try_from(record: &GanttRecord) -> Result<Self, Self::Error> {
        let start = parse_instant(&record.start).ok_or_else(|| RenderError::Date {
            field: "Start",
            value: record.start.clone(),
        })?;
        let finish = parse_instant(&record.finish).ok_or_else(|| RenderError::Date {
            field: "Finish",
            value: record.finish.clone(),
        })?;
        Ok(Self {
            task: record.task.clone(),
            start,
            finish,
            resource: record.resource.clone(),
        })
    }
}

/// Parse a calendar instant.
///
/// Accepts `YYYY-MM-DD` (midnight), `YYYY-MM-DDTHH:MM:SS[.f]`,
/// `YYYY-MM-DD HH:MM:SS[.f]` and RFC 3339 (normalized to UTC).
pub fn parse_instant(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(instant) = NaiveDateTime::parse_from_str(text, format) {
            return Some(instant);
        }
    }
    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|instant| instant.naive_utc())
}

// ============================================================================
// Traits
// ============================================================================

/// Output backend for plan data
pub trait Renderer<T: ?Sized> {
    type Output;

    /// Render the input to the output format
    fn render(&self, input: &T) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Row {row} does not match table columns: {detail}")]
    Schema { row: usize, detail: String },

    #[error("Invalid {field} date: {value:?}")]
    Date { field: &'static str, value: String },
}

/// Failure to complete the request/response exchange
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Could not decode response: {0}")]
    Decode(String),
}

// ============================================================================
// Tests
// ============================================================================
