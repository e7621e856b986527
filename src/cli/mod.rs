use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;

#[derive(Parser)]
#[command(name = "folio")]
#[command(
    version,
    about = "Portfolio return tracker with inferred cash flows"
)]
#[command(
    long_about = "Track a portfolio from daily value snapshots. Day-over-day changes are split into market gain and inferred cash flow, and rolled up into time-weighted returns for standard reporting periods."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Path to folio.toml (defaults to $FOLIO_CONFIG or the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// History CSV file (overrides config)
    #[arg(long, global = true)]
    pub history: Option<PathBuf>,

    /// Return method: twrr (default) or ratio
    #[arg(long, global = true)]
    pub method: Option<String>,

    /// Price implied for bare numeric cells: unit (1.0) or unknown (0.0)
    #[arg(long = "bare-price", global = true)]
    pub bare_price: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show returns for all standard periods
    Report {
        /// Also write the dashboard JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the most recent daily gain / cash flow decompositions
    Flows {
        /// Number of days to show
        #[arg(short = 'n', long, default_value_t = 5)]
        tail: usize,
    },

    /// Show returns for a single period
    Period {
        /// Period: 1d, wtd, mtd, ytd, 30d, 250d, all, YYYY (e.g., 2025), or from:to (YYYY-MM-DD:YYYY-MM-DD)
        spec: String,
    },

    /// Record one day's snapshot in the history file (skipped if the date exists)
    Record {
        /// Snapshot date (YYYY-MM-DD)
        date: String,

        /// Asset cells as ASSET=(value|price) or ASSET=value
        #[arg(required = true)]
        cells: Vec<String>,
    },
}
