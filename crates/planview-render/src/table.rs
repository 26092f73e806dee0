//! HTML table fragments for plan rows
//!
//! Columns come from the first row's keys. Header labels are the keys split
//! on `_` with each word capitalized; list cells become bullet lists and
//! multi-line text keeps its breaks.

use planview_core::{CellValue, RenderError, Renderer, Row, RowPolicy, TableSchema};

use crate::html_escape;

/// Titled HTML table renderer
#[derive(Clone, Debug)]
pub struct TableRenderer {
    /// Heading shown above the table
    pub title: String,
    /// Handling of rows that disagree with the first row's columns
    pub policy: RowPolicy,
}

impl TableRenderer {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            policy: RowPolicy::default(),
        }
    }

    /// Reject rows whose keys differ from the first row's
    pub fn strict(mut self) -> Self {
        self.policy = RowPolicy::Strict;
        self
    }

    pub fn policy(mut self, policy: RowPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Render rows to an HTML fragment; absent or empty rows give `""`
    pub fn render_rows(&self, rows: Option<&[Row]>) -> Result<String, RenderError> {
        let Some(rows) = rows else {
            return Ok(String::new());
        };
        let Some(schema) = TableSchema::from_rows(rows) else {
            return Ok(String::new());
        };

        let mut html = String::new();
        html.push_str("<div class=\"table-container\">\n");
        html.push_str(&format!("    <h3>{}</h3>\n", html_escape(&self.title)));
        html.push_str("    <table class=\"table table-striped\">\n");

        html.push_str("        <thead>\n            <tr>");
        for column in &schema.columns {
            html.push_str(&format!("<th>{}</th>", html_escape(&format_header(column))));
        }
        html.push_str("</tr>\n        </thead>\n");

        html.push_str("        <tbody>\n");
        for (index, row) in rows.iter().enumerate() {
            let cells = schema.conform(index, row, self.policy)?;
            html.push_str("            <tr>");
            for cell in &cells {
                html.push_str(&format!("<td>{}</td>", format_cell(cell)));
            }
            html.push_str("</tr>\n");
        }
        html.push_str("        </tbody>\n");

        html.push_str("    </table>\n</div>\n");
        Ok(html)
    }
}

impl Renderer<[Row]> for TableRenderer {
    type Output = String;

    fn render(&self, rows: &[Row]) -> Result<String, RenderError> {
        self.render_rows(Some(rows))
    }
}

/// Turn a column key into a header label: `task_name` -> `Task Name`
pub fn format_header(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render one cell's HTML content
pub fn format_cell(cell: &CellValue) -> String {
    match cell {
        CellValue::List(items) => {
            let list_items: String = items
                .iter()
                .map(|item| format!("<li>{}</li>", html_escape(item)))
                .collect();
            format!("<ul class=\"mb-0\">{}</ul>", list_items)
        }
        CellValue::Text(text) if text.contains('\n') => text
            .split('\n')
            .map(html_escape)
            .collect::<Vec<_>>()
            .join("<br>"),
        CellValue::Text(text) | CellValue::Scalar(text) => html_escape(text),
        CellValue::Empty => String::new(),
    }
}
