//! Command dispatcher that routes parsed CLI commands to their handlers.
//!
//! All handlers share [`Settings`]: the config file merged with global flags.

mod record;
mod report;

use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::cli::{Cli, Commands};
use folio::config::Config;
use folio::history::{self, BarePricePolicy};
use folio::reports::{AnnotatedSeries, ReturnMethod};

/// Effective options for one run; flags override the config file.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub history_file: PathBuf,
    pub output_file: Option<PathBuf>,
    pub bare_price: BarePricePolicy,
    pub return_method: ReturnMethod,
    pub json: bool,
}

impl Settings {
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let config = Config::load(cli.config.as_deref())?;
        Self::merge(config, cli)
    }

    fn merge(config: Config, cli: &Cli) -> Result<Self> {
        let bare_price = match cli.bare_price.as_deref() {
            Some(text) => text.parse()?,
            None => config.bare_price,
        };
        let return_method = match cli.method.as_deref() {
            Some(text) => text.parse()?,
            None => config.return_method,
        };

        let settings = Self {
            history_file: cli.history.clone().unwrap_or(config.history_file),
            output_file: config.output_file,
            bare_price,
            return_method,
            json: cli.json,
        };
        debug!("Effective settings: {:?}", settings);
        Ok(settings)
    }

    /// Load the history and decompose it into daily flows.
    pub fn load_annotated(&self) -> Result<AnnotatedSeries> {
        let series = history::read_history(&self.history_file, self.bare_price)?;
        info!(
            "Decomposing {} snapshots (bare price policy: {})",
            series.len(),
            self.bare_price
        );
        Ok(AnnotatedSeries::new(series))
    }
}

/// Route a parsed command to its handler
pub fn dispatch_command(cli: Cli) -> Result<()> {
    let settings = Settings::resolve(&cli)?;

    match cli.command {
        Commands::Report { output } => {
            report::dispatch_report(&settings, output.or_else(|| settings.output_file.clone()))
        }
        Commands::Flows { tail } => report::dispatch_flows(&settings, tail),
        Commands::Period { spec } => report::dispatch_period(&settings, &spec),
        Commands::Record { date, cells } => record::dispatch_record(&settings, &date, &cells),
    }
}
