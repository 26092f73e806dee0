//! WebAssembly bindings for the planview renderers
//!
//! Lets a browser page build the request body from its form and turn the
//! service response into table and timeline markup without a round trip.

use planview_core::{FormFields, GanttRecord, PlanRequest, PlanResponse, Renderer, Row};
use planview_render::{resource_color, ExcelRenderer, GanttRenderer, TableRenderer};
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in console
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Build the JSON request body from form field values
#[wasm_bindgen]
pub fn build_request(form_json: &str) -> Result<String, JsValue> {
    build_request_json(form_json).map_err(|e| JsValue::from_str(&e))
}

/// Render a JSON array of rows as a titled table fragment
#[wasm_bindgen]
pub fn render_table(rows_json: &str, title: &str) -> Result<String, JsValue> {
    table_fragment(rows_json, title).map_err(|e| JsValue::from_str(&e))
}

/// Render a JSON array of timeline records as a chart fragment
#[wasm_bindgen]
pub fn render_gantt(records_json: &str) -> Result<String, JsValue> {
    gantt_fragment(records_json).map_err(|e| JsValue::from_str(&e))
}

/// Export a whole service response as .xlsx bytes
#[wasm_bindgen]
pub fn export_xlsx(response_json: &str) -> Result<Vec<u8>, JsValue> {
    xlsx_bytes(response_json).map_err(|e| JsValue::from_str(&e))
}

/// CSS color of the resource at `index` in first-appearance order
#[wasm_bindgen]
pub fn resource_color_css(index: usize) -> String {
    resource_color(index).to_string()
}

fn build_request_json(form_json: &str) -> Result<String, String> {
    let fields: FormFields =
        serde_json::from_str(form_json).map_err(|e| format!("Invalid form: {}", e))?;
    serde_json::to_string(&PlanRequest::from(&fields)).map_err(|e| e.to_string())
}

fn table_fragment(rows_json: &str, title: &str) -> Result<String, String> {
    let rows: Option<Vec<Row>> =
        serde_json::from_str(rows_json).map_err(|e| format!("Invalid rows: {}", e))?;
    TableRenderer::new(title)
        .render_rows(rows.as_deref())
        .map_err(|e| e.to_string())
}

fn gantt_fragment(records_json: &str) -> Result<String, String> {
    let records: Option<Vec<GanttRecord>> =
        serde_json::from_str(records_json).map_err(|e| format!("Invalid timeline: {}", e))?;
    Ok(GanttRenderer::new().render_fragment(records.as_deref()))
}

fn xlsx_bytes(response_json: &str) -> Result<Vec<u8>, String> {
    let response: PlanResponse =
        serde_json::from_str(response_json).map_err(|e| format!("Invalid response: {}", e))?;
    ExcelRenderer::new()
        .render(&response)
        .map_err(|e| e.to_string())
}
