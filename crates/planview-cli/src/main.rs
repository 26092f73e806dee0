//! planview CLI - Project Plan Client
//!
//! Submits a project form to the planning service and writes the plan as a
//! standalone HTML page, or renders and exports saved responses offline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use planview_client::{
    FormController, HtmlDocument, HttpTransport, PlanView, SubmitOutcome, DEFAULT_ENDPOINT,
};
use planview_core::{FormFields, PlanResponse, Renderer, RowPolicy};
use planview_render::{ExcelRenderer, GanttRenderer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "planview")]
#[command(author, version, about = "Project plan client", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a project form to the planning service
    Submit {
        #[command(flatten)]
        form: FormArgs,

        /// Planning endpoint URL
        #[arg(long, env = "PLANVIEW_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
        endpoint: String,

        /// Give up after this many seconds (no limit if not specified)
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Also save the raw service response as JSON
        #[arg(long, value_name = "FILE")]
        save_response: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Render a saved service response as an HTML page
    Render {
        /// Response JSON file
        #[arg(value_name = "FILE")]
        response: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Export a saved service response to an Excel workbook
    Export {
        /// Response JSON file
        #[arg(value_name = "FILE")]
        response: PathBuf,

        /// Output .xlsx path
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Form values: a TOML file, overridden field by field by flags
#[derive(Args)]
struct FormArgs {
    /// TOML file with the form fields
    #[arg(long, value_name = "FILE")]
    form: Option<PathBuf>,

    #[arg(long)]
    project_name: Option<String>,

    #[arg(long)]
    industry: Option<String>,

    #[arg(long)]
    objectives: Option<String>,

    /// Team member (repeat for each member)
    #[arg(long = "team-member", value_name = "MEMBER")]
    team_members: Vec<String>,

    /// Project requirement (repeat for each requirement)
    #[arg(long = "requirement", value_name = "REQUIREMENT")]
    requirements: Vec<String>,

    /// Project start date (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<String>,

    /// Project end date (YYYY-MM-DD)
    #[arg(long)]
    end_date: Option<String>,
}

impl FormArgs {
    fn resolve(self) -> Result<FormFields> {
        let mut fields = match &self.form {
            Some(path) => load_form(path)?,
            None => FormFields::default(),
        };

        if let Some(name) = self.project_name {
            fields.project_name = name;
        }
        if let Some(industry) = self.industry {
            fields.industry = industry;
        }
        if let Some(objectives) = self.objectives {
            fields.project_objectives = objectives;
        }
        if !self.team_members.is_empty() {
            fields.team_members = self.team_members.join("\n");
        }
        if !self.requirements.is_empty() {
            fields.project_requirements = self.requirements.join("\n");
        }
        if let Some(start) = self.start_date {
            fields.project_start_date = start;
        }
        if let Some(end) = self.end_date {
            fields.project_end_date = end;
        }

        Ok(fields)
    }
}

#[derive(Args)]
struct OutputArgs {
    /// Output HTML file (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Reject table rows whose keys differ from the first row's
    #[arg(long)]
    strict_rows: bool,

    /// Also export the plan to an Excel workbook
    #[arg(long, value_name = "FILE")]
    xlsx: Option<PathBuf>,

    /// Timeline chart width in pixels
    #[arg(long, default_value_t = 900)]
    chart_width: u32,
}

impl OutputArgs {
    fn view(&self) -> PlanView {
        let policy = if self.strict_rows {
            RowPolicy::Strict
        } else {
            RowPolicy::Pad
        };
        let mut view = PlanView::new().row_policy(policy);
        view.gantt = GanttRenderer::new().width(self.chart_width);
        view
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = match cli.command {
        Commands::Submit {
            form,
            endpoint,
            timeout,
            save_response,
            output,
        } => {
            let fields = form.resolve()?;
            let transport = match timeout {
                Some(secs) => HttpTransport::with_timeout(endpoint, Duration::from_secs(secs))?,
                None => HttpTransport::new(endpoint),
            };
            tracing::info!(endpoint = transport.endpoint(), "Submitting project form");

            let controller = FormController::new(transport).with_view(output.view());
            let mut page = HtmlDocument::new(fields);
            let outcome = controller.submit(&mut page).await;
            let response = controller.take_last_response();

            if let (Some(path), Some(response)) = (&save_response, &response) {
                let json = serde_json::to_string_pretty(response)?;
                std::fs::write(path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
            finish_page(&page, &output, response.as_ref(), &outcome)?;
            outcome
        }
        Commands::Render { response, output } => {
            let response = load_response(&response)?;
            let mut page = HtmlDocument::default();
            let outcome = output.view().apply(&mut page, &response);
            finish_page(&page, &output, Some(&response), &outcome)?;
            outcome
        }
        Commands::Export { response, output } => {
            let response = load_response(&response)?;
            export_xlsx(&response, &output)?;
            SubmitOutcome::Rendered
        }
    };

    if !outcome.is_rendered() {
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_form(path: &Path) -> Result<FormFields> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read form {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Invalid form file {}", path.display()))
}

fn load_response(path: &Path) -> Result<PlanResponse> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read response {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid response file {}", path.display()))
}

fn export_xlsx(response: &PlanResponse, path: &Path) -> Result<()> {
    let bytes = ExcelRenderer::new().render(response)?;
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Exported plan to {}", path.display());
    Ok(())
}

/// Surface notifications, then write the page and the optional workbook
fn finish_page(
    page: &HtmlDocument,
    output: &OutputArgs,
    response: Option<&PlanResponse>,
    outcome: &SubmitOutcome,
) -> Result<()> {
    for message in page.notifications() {
        eprintln!("{}", message);
    }

    let html = page.to_html();
    match &output.output {
        Some(path) => std::fs::write(path, html)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => print!("{}", html),
    }

    if let (Some(path), Some(response), true) = (&output.xlsx, response, outcome.is_rendered()) {
        export_xlsx(response, path)?;
    }

    Ok(())
}
