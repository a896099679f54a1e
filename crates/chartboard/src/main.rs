//! chartboard - Dashboard chart filters from the terminal

mod cli;

use anyhow::{Context, Result};
use chartboard_core::{
    project, ChartDataset, ChartPreferences, ChartType, ChartWidget, FixedClock, PieDrillDown,
    TimeRangeMode,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "chartboard",
    version,
    about = "Dashboard chart filters from the terminal",
    long_about = "Replays chart widget interactions (time range modes, month/year pickers,\n\
                  custom date ranges) and renders series data the way the dashboard charts do.\n\
                  \n\
                  Examples:\n\
                    chartboard filter mode:weekly month:3            # Weekly view of March\n\
                    chartboard filter toggle:2023 --today 2024-06-10 # Compare with 2023\n\
                    chartboard filter mode:custom date:2024-01-05 date:2024-02-01 apply\n\
                    chartboard filter --start saved.json year:2023   # Continue from saved output\n\
                    chartboard project --input data.json --series \"Active Users\"\n\
                    chartboard prefs --chart line --mode weekly      # Change defaults\n\
                  \n\
                  Environment Variables:\n\
                    CHARTBOARD_PREFS_DIR             # Override preferences directory\n\
                    CHARTBOARD_NO_COLOR              # Disable ANSI colors (log-friendly)\n\
                    RUST_LOG                         # Log filter (default: chartboard=warn)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Preferences directory (default: ~/.config/chartboard)
    #[arg(long, env = "CHARTBOARD_PREFS_DIR")]
    prefs_dir: Option<PathBuf>,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, env = "CHARTBOARD_NO_COLOR")]
    no_color: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Apply filter actions and print the resulting configuration
    Filter {
        /// Actions in order: mode:weekly, month:3, year:2023, toggle:2023,
        /// date:2024-01-05, clear, reset, apply, open, chart:pie, gender:female, conversion:paid
        actions: Vec<String>,
        /// Start from a configuration saved with `filter --json`
        #[arg(long)]
        start: Option<PathBuf>,
        /// Pretend today is this date (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Project a dataset file into chart form
    Project {
        /// JSON file: an array of records or an object keyed by year
        #[arg(long, short = 'i')]
        input: PathBuf,
        /// Series keys to plot
        #[arg(long, short = 's', required = true)]
        series: Vec<String>,
        /// Chart type (default: from preferences)
        #[arg(long, short = 'c')]
        chart: Option<ChartType>,
        /// Pie chart: expand this category into its years
        #[arg(long)]
        drill: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or update widget defaults
    Prefs {
        /// Default chart type
        #[arg(long)]
        chart: Option<ChartType>,
        /// Default time range mode
        #[arg(long)]
        mode: Option<TimeRangeMode>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("chartboard=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .init();

    let prefs_dir = cli
        .prefs_dir
        .or_else(|| dirs::config_dir().map(|d| d.join("chartboard")))
        .context("Could not determine preferences directory")?;
    let no_color = cli.no_color;

    match cli.command {
        Command::Filter {
            actions,
            start,
            today,
            json,
        } => run_filter(
            &prefs_dir,
            &actions,
            start.as_deref(),
            today.as_deref(),
            json,
            no_color,
        ),
        Command::Project {
            input,
            series,
            chart,
            drill,
            json,
        } => run_project(&prefs_dir, &input, &series, chart, drill.as_deref(), json, no_color),
        Command::Prefs { chart, mode } => run_prefs(&prefs_dir, chart, mode),
    }
}

// ============================================================================
// CLI Command Handlers
// ============================================================================

fn run_filter(
    prefs_dir: &Path,
    actions: &[String],
    start: Option<&Path>,
    today: Option<&str>,
    json: bool,
    no_color: bool,
) -> Result<()> {
    let actions = actions
        .iter()
        .map(|raw| cli::Action::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let today = cli::parse_today(today)?.unwrap_or_else(|| chrono::Local::now().date_naive());
    let mut widget = match start {
        Some(path) => {
            let config = cli::load_configuration(path, today)?;
            ChartWidget::with_config(FixedClock(today), config)
        }
        None => ChartWidget::with_clock(FixedClock(today), &ChartPreferences::load(prefs_dir)),
    };

    // Rejected actions leave the configuration untouched; keep replaying.
    for action in &actions {
        let _ = action.run(&mut widget);
    }

    let notices = widget.take_notices();
    if !notices.is_empty() {
        eprintln!("{}", cli::format_notices(&notices));
    }
    println!("{}", cli::format_config(widget.config(), json, no_color));

    Ok(())
}

fn run_project(
    prefs_dir: &Path,
    input: &Path,
    series: &[String],
    chart: Option<ChartType>,
    drill: Option<&str>,
    json: bool,
    no_color: bool,
) -> Result<()> {
    let dataset = ChartDataset::load(input).map_err(cli::CliError::from)?;
    let chart_type = chart.unwrap_or(ChartPreferences::load(prefs_dir).default_chart_type);

    let mut drill_down = PieDrillDown::new();
    if let Some(category) = drill {
        if !drill_down.select(&dataset, category) {
            anyhow::bail!(
                "Cannot drill into '{}' (needs multi-year data with that category)",
                category
            );
        }
    }

    let view = project(chart_type, &dataset, series, &drill_down);
    println!("{}", cli::format_view(&view, json, no_color));

    if !json && view.is_empty() {
        eprintln!("\nNo values for series: {}", series.join(", "));
    }

    Ok(())
}

fn run_prefs(
    prefs_dir: &Path,
    chart: Option<ChartType>,
    mode: Option<TimeRangeMode>,
) -> Result<()> {
    let prefs = ChartPreferences::load(prefs_dir).with_overrides(chart, mode);

    if chart.is_some() || mode.is_some() {
        prefs.save(prefs_dir)?;
        eprintln!("✓ Saved preferences to {}", prefs_dir.display());
    }

    println!("Chart type: {}", prefs.default_chart_type);
    println!("Time range: {}", prefs.default_mode);

    Ok(())
}
