//! CLI argument definitions for Stockscope.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `plot` | Fetch the chart for one ticker |
//! | `insights` | Fetch volatility, trend, and anomaly insights |
//! | `show` | Submit the full form once and report both streams |
//! | `watch` | Drive the form interactively from stdin |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--api-url` | `$STOCKSCOPE_API_URL`, `$API_URL`, `http://localhost:5000` | Market service base URL |
//! | `--timeout-ms` | `$STOCKSCOPE_TIMEOUT_MS`, `15000` | Per-request timeout |
//! | `--pretty` | `false` | Pretty-print JSON output |
//!
//! # Examples
//!
//! ```bash
//! stockscope plot NVDA --period 6mo --plot-type moving-average --ma-window 50
//! stockscope insights ^GSPC --start 2024-01-02 --end 2024-03-28 --pretty
//! stockscope watch --policy live
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use stockscope_core::{CommitPolicy, FilterMode, MaWindow, PlotType};

/// Stockscope - market charts and insights from the command line
#[derive(Debug, Parser)]
#[command(
    name = "stockscope",
    author,
    version,
    about = "Market charts and insights from the command line"
)]
pub struct Cli {
    /// Market service base URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Request timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the chart for one ticker.
    Plot(PlotArgs),
    /// Fetch insights for one ticker.
    Insights(InsightsArgs),
    /// Fetch chart and insights together.
    Show(ShowArgs),
    /// Read form edits from stdin and print every applied update.
    Watch(WatchArgs),
}

/// Range selection shared by every fetch command.
#[derive(Debug, Clone, Args)]
pub struct RangeArgs {
    /// Lookback period, e.g. 1mo, 3mo, 6mo, 1y, 5d, ytd, max.
    #[arg(long, conflicts_with_all = ["start", "end"])]
    pub period: Option<String>,

    /// Range start (YYYY-MM-DD). Selects date-range mode.
    #[arg(long, requires = "end")]
    pub start: Option<String>,

    /// Range end (YYYY-MM-DD), no later than today.
    #[arg(long, requires = "start")]
    pub end: Option<String>,
}

impl RangeArgs {
    pub fn filter_mode(&self) -> FilterMode {
        if self.start.is_some() || self.end.is_some() {
            FilterMode::ByDateRange
        } else {
            FilterMode::ByPeriod
        }
    }
}

/// Plot selection.
#[derive(Debug, Clone, Args)]
pub struct PlotSelectArgs {
    /// close, volume, moving-average, or volume-weighted.
    #[arg(long, default_value_t = PlotType::Close)]
    pub plot_type: PlotType,

    /// Moving-average window in days (10-300); used by moving-average only.
    #[arg(long, default_value_t = u32::from(MaWindow::DEFAULT.get()))]
    pub ma_window: u32,
}

#[derive(Debug, Clone, Args)]
pub struct PlotArgs {
    pub ticker: String,

    #[command(flatten)]
    pub range: RangeArgs,

    #[command(flatten)]
    pub plot: PlotSelectArgs,

    /// Also write the chart JSON to this file.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct InsightsArgs {
    pub ticker: String,

    #[command(flatten)]
    pub range: RangeArgs,
}

#[derive(Debug, Clone, Args)]
pub struct ShowArgs {
    pub ticker: String,

    #[command(flatten)]
    pub range: RangeArgs,

    #[command(flatten)]
    pub plot: PlotSelectArgs,
}

#[derive(Debug, Clone, Args)]
pub struct WatchArgs {
    /// When edits reach the service: on-submit, live, or reveal-on-submit.
    #[arg(long, default_value_t = CommitPolicy::OnSubmit)]
    pub policy: CommitPolicy,
}
