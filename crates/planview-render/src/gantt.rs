//! Timeline (Gantt) chart renderer
//!
//! Rendering happens in two steps:
//! - [`GanttRenderer::layout`] turns raw timeline rows into a [`GanttChart`]:
//!   one horizontal bar per task, bar length in days, a color per resource,
//!   hover text and the overall chart geometry.
//! - [`GanttRenderer::draw`] writes that chart as SVG.
//!
//! [`GanttRenderer::render_fragment`] wraps both for a page container: it
//! never fails, falling back to a placeholder for empty input and to a
//! warning panel when the chart cannot be built.

use std::fmt;

use chrono::NaiveDateTime;
use planview_core::{GanttEntry, GanttRecord, RenderError, Renderer};
use svg::node::element::{Element, Group, Line, Rectangle, Text};
use svg::{Document, Node};

use crate::{html_escape, truncate};

/// Shown instead of a chart when there are no timeline rows
pub const NO_TIMELINE_PLACEHOLDER: &str =
    "<p class=\"text-muted\">No timeline data available</p>";

/// An RGB color triple
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.0, self.1, self.2)
    }
}

/// Color for the resource at `index` in first-appearance order.
///
/// Colors repeat every 255 resources and may clash well before that.
pub fn resource_color(index: usize) -> Rgb {
    let i = (index % 255) as u32;
    Rgb(
        (i * 30 % 255) as u8,
        (i * 60 % 255) as u8,
        (i * 90 % 255) as u8,
    )
}

/// Distinct resources in first-appearance order, each with its color
pub fn assign_colors<'a, I>(resources: I) -> Vec<(String, Rgb)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut palette: Vec<(String, Rgb)> = Vec::new();
    for resource in resources {
        if !palette.iter().any(|(name, _)| name == resource) {
            let color = resource_color(palette.len());
            palette.push((resource.to_string(), color));
        }
    }
    palette
}

/// One task bar
#[derive(Clone, Debug, PartialEq)]
pub struct GanttBar {
    pub task: String,
    pub resource: String,
    pub start: NaiveDateTime,
    pub finish: NaiveDateTime,
    /// Bar length: Finish - Start in days
    pub duration_days: f64,
    pub color: Rgb,
    /// Resource name, then `start - finish`
    pub hover_text: String,
}

/// Plot margins in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChartMargin {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Default for ChartMargin {
    fn default() -> Self {
        Self {
            left: 200,
            right: 20,
            top: 50,
            bottom: 100,
        }
    }
}

/// Laid-out timeline, ready to draw
#[derive(Clone, Debug, PartialEq)]
pub struct GanttChart {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub show_grid: bool,
    pub width: u32,
    pub height: u32,
    pub margin: ChartMargin,
    /// Bars in input order
    pub bars: Vec<GanttBar>,
    /// Resource colors in first-appearance order, drawn as the legend
    pub palette: Vec<(String, Rgb)>,
}

/// Timeline chart renderer configuration
#[derive(Clone, Debug)]
pub struct GanttRenderer {
    /// Total SVG width in pixels
    pub width: u32,
    /// Height added per task
    pub height_per_task: u32,
    /// Chart height floor
    pub min_height: u32,
    pub margin: ChartMargin,
    /// chrono format for hover dates
    pub date_format: String,
    pub background_color: String,
    pub grid_color: String,
    pub text_color: String,
    pub font_family: String,
    pub font_size: u32,
}

impl Default for GanttRenderer {
    fn default() -> Self {
        Self {
            width: 900,
            height_per_task: 40,
            min_height: 400,
            margin: ChartMargin::default(),
            date_format: "%-m/%-d/%Y".into(),
            background_color: "#ffffff".into(),
            grid_color: "#ecf0f1".into(),
            text_color: "#2c3e50".into(),
            font_family: "system-ui, -apple-system, sans-serif".into(),
            font_size: 12,
        }
    }
}

impl GanttRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure total chart width
    pub fn width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    /// Configure the hover date format
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Chart height for a number of tasks
    pub fn chart_height(&self, task_count: usize) -> u32 {
        let scaled = u32::try_from(task_count)
            .unwrap_or(u32::MAX)
            .saturating_mul(self.height_per_task);
        scaled.max(self.min_height)
    }

    /// Build the chart layout from raw timeline rows
    pub fn layout(&self, records: &[GanttRecord]) -> Result<GanttChart, RenderError> {
        if records.is_empty() {
            return Err(RenderError::InvalidData("No timeline rows to render".into()));
        }

        let entries = records
            .iter()
            .map(GanttEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let palette = assign_colors(entries.iter().map(|entry| entry.resource.as_str()));

        let bars = entries
            .into_iter()
            .map(|entry| {
                let color = palette
                    .iter()
                    .find(|(name, _)| *name == entry.resource)
                    .map_or(resource_color(0), |(_, color)| *color);
                let hover_text = format!(
                    "{}\n{} - {}",
                    entry.resource,
                    entry.start.format(&self.date_format),
                    entry.finish.format(&self.date_format)
                );
                GanttBar {
                    duration_days: entry.duration_days(),
                    task: entry.task,
                    resource: entry.resource,
                    start: entry.start,
                    finish: entry.finish,
                    color,
                    hover_text,
                }
            })
            .collect::<Vec<_>>();

        Ok(GanttChart {
            title: "Project Timeline".into(),
            x_axis_title: "Duration (Days)".into(),
            y_axis_title: "Tasks".into(),
            show_grid: true,
            width: self.width,
            height: self.chart_height(bars.len()),
            margin: self.margin,
            bars,
            palette,
        })
    }

    /// Render the content of a timeline container.
    ///
    /// Empty input gives the placeholder; a chart that cannot be built gives
    /// a warning panel carrying the failure message.
    pub fn render_fragment(&self, records: Option<&[GanttRecord]>) -> String {
        let records = match records {
            Some(records) if !records.is_empty() => records,
            _ => {
                tracing::info!("No data available for Gantt chart");
                return NO_TIMELINE_PLACEHOLDER.to_string();
            }
        };

        tracing::debug!(rows = records.len(), "rendering Gantt chart");

        match self.render(records) {
            Ok(svg) => format!("<div class=\"gantt-chart\">\n{}\n</div>\n", svg),
            Err(e) => {
                tracing::error!("Error creating Gantt chart: {}", e);
                format!(
                    "<div class=\"alert alert-warning\">Error creating timeline: {}</div>",
                    html_escape(&e.to_string())
                )
            }
        }
    }

    /// Write a laid-out chart as an SVG document
    pub fn draw(&self, chart: &GanttChart) -> Result<String, RenderError> {
        if chart.bars.is_empty() {
            return Err(RenderError::InvalidData("No timeline rows to render".into()));
        }
        if chart.width <= chart.margin.left.saturating_add(chart.margin.right)
            || chart.height <= chart.margin.top.saturating_add(chart.margin.bottom)
        {
            return Err(RenderError::InvalidData(format!(
                "Chart of {}x{} px leaves no room inside its margins",
                chart.width, chart.height
            )));
        }

        let axis = ValueAxis::fit(chart.bars.iter().map(|bar| bar.duration_days));
        let plot = PlotArea::new(chart);

        let mut document = Document::new()
            .set("width", chart.width)
            .set("height", chart.height)
            .set("viewBox", (0, 0, chart.width, chart.height))
            .set("xmlns", "http://www.w3.org/2000/svg");

        let background = Rectangle::new()
            .set("width", "100%")
            .set("height", "100%")
            .set("fill", self.background_color.as_str());
        document = document.add(background);

        let title = Text::new(chart.title.as_str())
            .set("x", chart.width / 2)
            .set("y", chart.margin.top / 2 + 6)
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size.saturating_add(5))
            .set("fill", self.text_color.as_str())
            .set("text-anchor", "middle");
        document = document.add(title);

        if chart.show_grid {
            document = document.add(self.render_grid(chart, &plot, &axis));
        }
        document = document.add(self.render_axes(chart, &plot, &axis));

        for (row, bar) in chart.bars.iter().enumerate() {
            document = document.add(self.render_bar(bar, row, &plot, &axis));
        }
        document = document.add(self.render_legend(chart, &plot));

        let mut output = Vec::new();
        svg::write(&mut output, &document)
            .map_err(|e| RenderError::Format(format!("Failed to write SVG: {}", e)))?;

        String::from_utf8(output).map_err(|e| RenderError::Format(format!("Invalid UTF-8: {}", e)))
    }

    /// Vertical value grid lines plus one horizontal line per task row
    fn render_grid(&self, chart: &GanttChart, plot: &PlotArea, axis: &ValueAxis) -> Group {
        let mut group = Group::new().set("class", "grid");

        for tick in axis.ticks() {
            let x = plot.x(axis.fraction(tick));
            let line = Line::new()
                .set("x1", x)
                .set("y1", plot.top)
                .set("x2", x)
                .set("y2", plot.bottom)
                .set("stroke", self.grid_color.as_str())
                .set("stroke-width", 1);
            group = group.add(line);
        }

        for row in 0..chart.bars.len() {
            let y = plot.row_center(row);
            let line = Line::new()
                .set("x1", plot.left)
                .set("y1", y)
                .set("x2", plot.right)
                .set("y2", y)
                .set("stroke", self.grid_color.as_str())
                .set("stroke-width", 1);
            group = group.add(line);
        }

        group
    }

    /// Axis lines, tick labels, task labels and axis titles
    fn render_axes(&self, chart: &GanttChart, plot: &PlotArea, axis: &ValueAxis) -> Group {
        let mut group = Group::new().set("class", "axes");

        let zero_x = plot.x(axis.fraction(0.0));
        group = group
            .add(
                Line::new()
                    .set("x1", plot.left)
                    .set("y1", plot.bottom)
                    .set("x2", plot.right)
                    .set("y2", plot.bottom)
                    .set("stroke", self.text_color.as_str())
                    .set("stroke-width", 1),
            )
            .add(
                Line::new()
                    .set("x1", zero_x)
                    .set("y1", plot.top)
                    .set("x2", zero_x)
                    .set("y2", plot.bottom)
                    .set("stroke", self.text_color.as_str())
                    .set("stroke-width", 1),
            );

        for tick in axis.ticks() {
            let label = Text::new(axis.label(tick))
                .set("x", plot.x(axis.fraction(tick)))
                .set("y", plot.bottom + 18.0)
                .set("font-family", self.font_family.as_str())
                .set("font-size", self.font_size.saturating_sub(1))
                .set("fill", self.text_color.as_str())
                .set("text-anchor", "middle");
            group = group.add(label);
        }

        for (row, bar) in chart.bars.iter().enumerate() {
            let label = Text::new(truncate(&bar.task, 30))
                .set("x", plot.left - 8.0)
                .set("y", plot.row_center(row) + 4.0)
                .set("font-family", self.font_family.as_str())
                .set("font-size", self.font_size)
                .set("fill", self.text_color.as_str())
                .set("text-anchor", "end");
            group = group.add(label);
        }

        let x_title = Text::new(chart.x_axis_title.as_str())
            .set("x", (plot.left + plot.right) / 2.0)
            .set("y", plot.bottom + 48.0)
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size.saturating_add(1))
            .set("fill", self.text_color.as_str())
            .set("text-anchor", "middle");
        group = group.add(x_title);

        let y_center = (plot.top + plot.bottom) / 2.0;
        let y_title = Text::new(chart.y_axis_title.as_str())
            .set("x", 16)
            .set("y", y_center)
            .set("transform", format!("rotate(-90 16 {})", y_center))
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size.saturating_add(1))
            .set("fill", self.text_color.as_str())
            .set("text-anchor", "middle");
        group = group.add(y_title);

        group
    }

    /// One swatch and name per resource, in a row below the axis title
    fn render_legend(&self, chart: &GanttChart, plot: &PlotArea) -> Group {
        let mut group = Group::new().set("class", "legend");
        let swatch = f64::from(self.font_size.max(1));
        let y = plot.bottom + 72.0;
        let mut x = plot.left;

        for (resource, color) in &chart.palette {
            let label = truncate(resource, 24);
            group = group
                .add(
                    Rectangle::new()
                        .set("x", x)
                        .set("y", y - swatch + 2.0)
                        .set("width", swatch)
                        .set("height", swatch)
                        .set("fill", color.to_string()),
                )
                .add(
                    Text::new(label.as_str())
                        .set("x", x + swatch + 4.0)
                        .set("y", y)
                        .set("font-family", self.font_family.as_str())
                        .set("font-size", self.font_size)
                        .set("fill", self.text_color.as_str()),
                );
            // Rough text width: 0.6 em per character
            x += swatch + 16.0 + label.chars().count() as f64 * swatch * 0.6;
        }

        group
    }

    /// One bar with its hover tooltip
    fn render_bar(&self, bar: &GanttBar, row: usize, plot: &PlotArea, axis: &ValueAxis) -> Group {
        let mut group = Group::new().set("class", "task");

        let x_zero = plot.x(axis.fraction(0.0));
        let x_end = plot.x(axis.fraction(bar.duration_days));
        let bar_height = plot.row_height() * 0.8;
        let y = plot.row_center(row) - bar_height / 2.0;

        let rect = Rectangle::new()
            .set("x", x_zero.min(x_end))
            .set("y", y)
            .set("width", (x_end - x_zero).abs())
            .set("height", bar_height)
            .set("fill", bar.color.to_string());
        group = group.add(rect);

        let mut tooltip = Element::new("title");
        tooltip.append(svg::node::Text::new(bar.hover_text.as_str()));
        group.add(tooltip)
    }
}

impl Renderer<[GanttRecord]> for GanttRenderer {
    type Output = String;

    fn render(&self, records: &[GanttRecord]) -> Result<String, RenderError> {
        let chart = self.layout(records)?;
        self.draw(&chart)
    }
}

/// Pixel bounds of the plotting region
struct PlotArea {
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    rows: usize,
}

impl PlotArea {
    fn new(chart: &GanttChart) -> Self {
        Self {
            left: chart.margin.left as f64,
            right: (chart.width - chart.margin.right) as f64,
            top: chart.margin.top as f64,
            bottom: (chart.height - chart.margin.bottom) as f64,
            rows: chart.bars.len().max(1),
        }
    }

    fn x(&self, fraction: f64) -> f64 {
        self.left + fraction * (self.right - self.left)
    }

    fn row_height(&self) -> f64 {
        (self.bottom - self.top) / self.rows as f64
    }

    /// Rows stack upwards: the first task sits at the bottom
    fn row_center(&self, row: usize) -> f64 {
        self.bottom - (row as f64 + 0.5) * self.row_height()
    }
}

/// Linear day axis with rounded tick spacing
struct ValueAxis {
    min: f64,
    max: f64,
    step: f64,
}

impl ValueAxis {
    /// Fit an axis that includes zero and every value
    fn fit(values: impl Iterator<Item = f64>) -> Self {
        let (mut min, mut max) = values
            .filter(|v| v.is_finite())
            .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if max - min <= f64::EPSILON {
            max = min + 1.0;
        }
        let step = nice_step((max - min) / 8.0);
        min = (min / step).floor() * step;
        max = (max / step).ceil() * step;
        Self { min, max, step }
    }

    fn fraction(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }

    fn ticks(&self) -> Vec<f64> {
        let count = ((self.max - self.min) / self.step).round() as usize;
        (0..=count)
            .map(|i| self.min + i as f64 * self.step)
            .collect()
    }

    fn label(&self, value: f64) -> String {
        if self.step.fract() == 0.0 {
            format!("{:.0}", value)
        } else {
            format!("{:.1}", value)
        }
    }
}

/// Round a raw step up to 1, 2 or 5 times a power of ten
fn nice_step(raw: f64) -> f64 {
    if raw <= 0.0 || !raw.is_finite() {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}
