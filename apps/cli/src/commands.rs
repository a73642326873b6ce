//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use cityscout_core::{DEFAULT_DIAGRAM_PATH, Workflow, WorkflowObserver, export_diagram};
use cityscout_knowledge::StaticKnowledgeBase;
use cityscout_shared::{AppConfig, Source, Step, init_config, load_config, load_config_from};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::report;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// CityScout: city summaries, forecasts, and photos from one query.
#[derive(Parser)]
#[command(
    name = "cityscout",
    version,
    about = "Ask about a city: summary, 7-day forecast, and photos.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.cityscout/cityscout.toml.
    #[arg(long, global = true, env = "CITYSCOUT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Report output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Look up a city and print the report.
    Explore {
        /// City name, e.g. "Paris" or "new york".
        city: String,

        /// Output format: text or json.
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Hide the notes listing fallback values.
        #[arg(long)]
        quiet_notes: bool,
    },

    /// Write the workflow diagram as a Mermaid flowchart.
    Graph {
        /// Output path.
        #[arg(short, long, default_value = DEFAULT_DIAGRAM_PATH)]
        out: PathBuf,
    },

    /// List the cities in the lookup table.
    Cities,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so reports on
/// stdout stay pipeable.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "cityscout=info",
        1 => "cityscout=debug",
        _ => "cityscout=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Explore {
            city,
            format,
            quiet_notes,
        } => cmd_explore(config_path, &city, format, !quiet_notes).await,
        Command::Graph { out } => cmd_graph(&out),
        Command::Cities => cmd_cities(config_path),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_explore(
    config_path: Option<&Path>,
    city: &str,
    format: OutputFormat,
    show_notes: bool,
) -> Result<()> {
    if city.trim().is_empty() {
        return Err(eyre!("please enter a city name"));
    }

    let config = resolve_config(config_path)?;
    let workflow = Workflow::with_defaults(&config)?;

    info!(city, "exploring city");

    let state = match format {
        OutputFormat::Text => {
            let progress = CliProgress::new();
            let state = workflow.run(city, &progress).await;
            progress.finish();
            state?
        }
        OutputFormat::Json => workflow.run(city, &cityscout_core::SilentObserver).await?,
    };

    match format {
        OutputFormat::Text => print!("{}", report::render_text(&state, show_notes)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&state)?),
    }

    Ok(())
}

fn cmd_graph(out: &Path) -> Result<()> {
    // A diagram is a convenience; failing to write one is not a command failure.
    match export_diagram(out) {
        Ok(()) => println!("Workflow diagram written to {}", out.display()),
        Err(e) => warn!(error = %e, path = %out.display(), "could not write workflow diagram"),
    }
    Ok(())
}

fn cmd_cities(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let knowledge = StaticKnowledgeBase::with_overrides(config.knowledge);

    println!();
    println!("  {:<16} {:<12} {:>10} {:>11}", "City", "Country", "Latitude", "Longitude");
    for entry in knowledge.entries() {
        println!(
            "  {:<16} {:<12} {:>10.4} {:>11.4}",
            entry.city, entry.country, entry.latitude, entry.longitude
        );
    }
    println!();
    println!("  {} cities in the knowledge base", knowledge.len());
    println!();
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config file created at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&Path>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str =
        toml::to_string_pretty(&config).map_err(|e| eyre!("failed to serialize config: {e}"))?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner showing the running workflow step.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            spinner.set_style(
                style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
            );
        }
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl WorkflowObserver for CliProgress {
    fn step_started(&self, step: Step) {
        if !matches!(step, Step::Start | Step::End) {
            self.spinner.set_message(format!("{}...", step.label()));
        }
    }

    fn step_finished(&self, step: Step, source: Option<&Source>) {
        if source.is_some_and(Source::is_degraded) {
            self.spinner
                .println(format!("  {} unavailable, using fallback", step.label()));
        }
    }
}
