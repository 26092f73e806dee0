//! # planview-render
//!
//! Rendering backends for planning service responses.
//!
//! This crate provides:
//! - HTML table fragments for task and milestone rows
//! - SVG timeline (Gantt) charts with per-resource colors
//! - Excel workbooks of a whole response
//!
//! ## Example
//!
//! ```rust,ignore
//! use planview_core::Renderer;
//! use planview_render::{ExcelRenderer, GanttRenderer, TableRenderer};
//!
//! let tasks_html = TableRenderer::new("Tasks Breakdown").render_rows(response.tasks.as_deref())?;
//! let chart_html = GanttRenderer::new().render_fragment(response.gantt_chart.as_deref());
//! let xlsx_bytes = ExcelRenderer::new().render(&response)?;
//! std::fs::write("project_plan.xlsx", xlsx_bytes)?;
//! ```

pub mod excel;
pub mod gantt;
pub mod table;

pub use excel::ExcelRenderer;
pub use gantt::{
    assign_colors, resource_color, ChartMargin, GanttBar, GanttChart, GanttRenderer, Rgb,
    NO_TIMELINE_PLACEHOLDER,
};
pub use table::{format_cell, format_header, TableRenderer};

/// HTML-escape a string
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Truncate a string with ellipsis
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!(
            "{}…",
            s.chars().take(max.saturating_sub(1)).collect::<String>()
        )
    }
}
