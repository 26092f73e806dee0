//! Excel export of a plan response
//!
//! Writes one sheet per part of the plan:
//! - Tasks: the task rows, columns from the first row
//! - Milestones: the milestone rows, columns from the first row
//! - Gantt Timeline: Task / Start / Finish / Resource
//!
//! Headers use the raw column keys. Every column is sized to its longest
//! value plus two characters.

use planview_core::{
    CellValue, GanttRecord, PlanResponse, RenderError, Renderer, Row, RowPolicy, TableSchema,
};
use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet};

const GANTT_COLUMNS: [&str; 4] = ["Task", "Start", "Finish", "Resource"];

/// Excel workbook renderer
#[derive(Clone, Debug)]
pub struct ExcelRenderer {
    /// Whether to add the Gantt Timeline sheet
    pub include_timeline: bool,
    /// Header fill color
    pub header_color: u32,
    /// Handling of ragged rows
    pub policy: RowPolicy,
}

impl Default for ExcelRenderer {
    fn default() -> Self {
        Self {
            include_timeline: true,
            header_color: 0xD3D3D3,
            policy: RowPolicy::default(),
        }
    }
}

impl ExcelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leave out the Gantt Timeline sheet
    pub fn no_timeline(mut self) -> Self {
        self.include_timeline = false;
        self
    }

    /// Generate workbook bytes
    pub fn render_to_bytes(&self, response: &PlanResponse) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();
        let header = Format::new()
            .set_bold()
            .set_background_color(self.header_color)
            .set_border(FormatBorder::Thin);

        self.add_row_sheet(&mut workbook, "Tasks", response.tasks.as_deref(), &header)?;
        self.add_row_sheet(
            &mut workbook,
            "Milestones",
            response.milestones.as_deref(),
            &header,
        )?;
        if self.include_timeline {
            self.add_timeline_sheet(&mut workbook, response.gantt_chart.as_deref(), &header)?;
        }

        workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))
    }

    fn add_row_sheet(
        &self,
        workbook: &mut Workbook,
        name: &str,
        rows: Option<&[Row]>,
        header: &Format,
    ) -> Result<(), RenderError> {
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(name)
            .map_err(|e| RenderError::Format(e.to_string()))?;

        let rows = rows.unwrap_or_default();
        let Some(schema) = TableSchema::from_rows(rows) else {
            return Ok(());
        };

        let body = rows
            .iter()
            .enumerate()
            .map(|(index, row)| schema.conform(index, row, self.policy))
            .collect::<Result<Vec<_>, _>>()?;

        write_sheet(sheet, &schema.columns, &body, header)
    }

    fn add_timeline_sheet(
        &self,
        workbook: &mut Workbook,
        records: Option<&[GanttRecord]>,
        header: &Format,
    ) -> Result<(), RenderError> {
        let sheet = workbook.add_worksheet();
        sheet
            .set_name("Gantt Timeline")
            .map_err(|e| RenderError::Format(e.to_string()))?;

        let records = records.unwrap_or_default();
        if records.is_empty() {
            return Ok(());
        }

        let columns: Vec<String> = GANTT_COLUMNS.iter().map(|c| c.to_string()).collect();
        let body: Vec<Vec<CellValue>> = records
            .iter()
            .map(|record| {
                [&record.task, &record.start, &record.finish, &record.resource]
                    .into_iter()
                    .map(|text| CellValue::Text(text.clone()))
                    .collect()
            })
            .collect();

        write_sheet(sheet, &columns, &body, header)
    }
}

impl Renderer<PlanResponse> for ExcelRenderer {
    type Output = Vec<u8>;

    fn render(&self, response: &PlanResponse) -> Result<Vec<u8>, RenderError> {
        if !response.success {
            return Err(RenderError::InvalidData(format!(
                "Cannot export a failed plan: {}",
                response.error.as_deref().unwrap_or("Unknown error")
            )));
        }
        self.render_to_bytes(response)
    }
}

/// Write a header row and body, then size each column to fit
fn write_sheet(
    sheet: &mut Worksheet,
    columns: &[String],
    body: &[Vec<CellValue>],
    header: &Format,
) -> Result<(), RenderError> {
    for (col, name) in columns.iter().enumerate() {
        sheet
            .write_with_format(0, column_number(col)?, name.as_str(), header)
            .map_err(|e| RenderError::Format(e.to_string()))?;
    }

    for (index, cells) in body.iter().enumerate() {
        let row = u32::try_from(index + 1)
            .map_err(|_| RenderError::InvalidData(format!("Row {} is past the sheet limit", index)))?;
        for (col, cell) in cells.iter().enumerate() {
            let col = column_number(col)?;
            let written = match cell {
                CellValue::Scalar(text) => match text.parse::<f64>() {
                    Ok(number) => sheet.write(row, col, number),
                    Err(_) => sheet.write(row, col, text.as_str()),
                },
                CellValue::Empty => continue,
                other => sheet.write(row, col, other.to_plain_text().as_str()),
            };
            written.map_err(|e| RenderError::Format(e.to_string()))?;
        }
    }

    for (col, width) in column_widths(columns, body).into_iter().enumerate() {
        sheet
            .set_column_width(column_number(col)?, width)
            .map_err(|e| RenderError::Format(e.to_string()))?;
    }

    Ok(())
}

/// Sheet column number for a zero-based column index
fn column_number(col: usize) -> Result<u16, RenderError> {
    u16::try_from(col)
        .map_err(|_| RenderError::InvalidData(format!("Column {} is past the sheet limit", col)))
}

/// Longest text per column (header included) plus two, capped at Excel's limit
fn column_widths(columns: &[String], body: &[Vec<CellValue>]) -> Vec<f64> {
    columns
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let longest = body
                .iter()
                .filter_map(|cells| cells.get(col))
                .map(|cell| cell.to_plain_text().chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0);
            ((longest + 2) as f64).min(255.0)
        })
        .collect()
}
