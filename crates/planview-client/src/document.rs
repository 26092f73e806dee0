//! In-memory page that serializes to a standalone HTML document

use planview_core::FormFields;
use planview_render::html_escape;

use crate::page::{Container, Page};

/// A page held in memory: form values, container contents, indicator state
/// and the notifications raised while it was in use.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HtmlDocument {
    fields: FormFields,
    tasks_table: String,
    milestones_table: String,
    gantt_chart: String,
    busy: bool,
    submit_enabled: bool,
    notifications: Vec<String>,
}

impl Default for HtmlDocument {
    fn default() -> Self {
        Self::new(FormFields::default())
    }
}

impl HtmlDocument {
    pub fn new(fields: FormFields) -> Self {
        Self {
            fields,
            tasks_table: String::new(),
            milestones_table: String::new(),
            gantt_chart: String::new(),
            busy: false,
            submit_enabled: true,
            notifications: Vec::new(),
        }
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    /// Current HTML of a container
    pub fn content(&self, container: Container) -> &str {
        match container {
            Container::TasksTable => &self.tasks_table,
            Container::MilestonesTable => &self.milestones_table,
            Container::GanttChart => &self.gantt_chart,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_submit_enabled(&self) -> bool {
        self.submit_enabled
    }

    /// Notifications in the order they were raised
    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }

    /// Serialize the page as a standalone HTML document
    pub fn to_html(&self) -> String {
        let title = if self.fields.project_name.is_empty() {
            "Project Plan".to_string()
        } else {
            format!("{} - Project Plan", html_escape(&self.fields.project_name))
        };

        let notifications: String = self
            .notifications
            .iter()
            .map(|message| {
                format!(
                    "        <div class=\"alert alert-danger\" role=\"alert\">{}</div>\n",
                    html_escape(message)
                )
            })
            .collect();

        let spinner_class = if self.busy {
            "spinner-border"
        } else {
            "spinner-border d-none"
        };

        let containers: String = Container::ALL
            .iter()
            .map(|&container| {
                format!(
                    "        <section id=\"{}\">\n{}\n        </section>\n",
                    container.element_id(),
                    self.content(container)
                )
            })
            .collect();

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{css}
    </style>
</head>
<body>
    <main class="container">
        <h1>{title}</h1>
{summary}
        <div id="loadingSpinner" class="{spinner_class}" role="status"></div>
{notifications}{containers}    </main>
</body>
</html>
"#,
            title = title,
            css = STYLE,
            summary = self.render_summary(),
            spinner_class = spinner_class,
            notifications = notifications,
            containers = containers,
        )
    }

    /// The submitted form values as a definition list
    fn render_summary(&self) -> String {
        let fields = &self.fields;
        let entries = [
            ("Project Name", fields.project_name.as_str()),
            ("Industry", fields.industry.as_str()),
            ("Project Objectives", fields.project_objectives.as_str()),
            ("Team Members", fields.team_members.as_str()),
            ("Project Requirements", fields.project_requirements.as_str()),
            ("Start Date", fields.project_start_date.as_str()),
            ("End Date", fields.project_end_date.as_str()),
        ];

        let mut html = String::from("        <dl class=\"plan-summary\">\n");
        for (label, value) in entries.iter().filter(|(_, value)| !value.is_empty()) {
            let value = value
                .split('\n')
                .map(html_escape)
                .collect::<Vec<_>>()
                .join("<br>");
            html.push_str(&format!("            <dt>{}</dt><dd>{}</dd>\n", label, value));
        }
        html.push_str("        </dl>");
        html
    }
}

impl Page for HtmlDocument {
    fn form_fields(&self) -> FormFields {
        self.fields.clone()
    }

    fn set_content(&mut self, container: Container, html: String) {
        match container {
            Container::TasksTable => self.tasks_table = html,
            Container::MilestonesTable => self.milestones_table = html,
            Container::GanttChart => self.gantt_chart = html,
        }
    }

    fn set_busy(&mut self, busy: bool) {
        self.busy = busy;
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.submit_enabled = enabled;
    }

    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_string());
    }
}

const STYLE: &str = r"        body { font-family: system-ui, -apple-system, sans-serif; color: #2c3e50; margin: 0; }
        .container { max-width: 1100px; margin: 0 auto; padding: 20px; }
        .plan-summary dt { font-weight: bold; margin-top: 8px; }
        .plan-summary dd { margin-left: 0; }
        .table-container { margin: 24px 0; }
        .table { border-collapse: collapse; width: 100%; }
        .table th, .table td { border: 1px solid #dee2e6; padding: 8px; text-align: left; vertical-align: top; }
        .table-striped tbody tr:nth-of-type(odd) { background: #f8f9fa; }
        .mb-0 { margin-bottom: 0; padding-left: 18px; }
        .text-muted { color: #6c757d; }
        .alert { padding: 12px 16px; border-radius: 4px; margin: 12px 0; }
        .alert-warning { background: #fff3cd; color: #856404; }
        .alert-danger { background: #f8d7da; color: #721c24; }
        .d-none { display: none; }
        .gantt-chart { overflow-x: auto; }";
