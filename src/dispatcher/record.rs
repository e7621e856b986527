//! Record command: append one day's snapshot to the history file

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use colored::Colorize;
use std::collections::BTreeMap;
use tracing::warn;

use super::Settings;
use folio::history::{self, try_parse_cell, AssetCell, BarePricePolicy, Snapshot};
use folio::utils::format_currency;

/// Parse `ASSET=(value|price)` / `ASSET=value` arguments.
fn parse_cells(cells: &[String], policy: BarePricePolicy) -> Result<BTreeMap<String, AssetCell>> {
    let mut assets = BTreeMap::new();
    for arg in cells {
        let (asset, raw) = arg
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid cell '{}'. Use ASSET=(value|price) or ASSET=value", arg))?;
        let asset = asset.trim();
        if asset.is_empty() {
            return Err(anyhow!("Missing asset name in '{}'", arg));
        }

        let cell = try_parse_cell(raw, policy).unwrap_or_else(|| {
            warn!("Cell for {} could not be parsed ('{}'); recording zero", asset, raw);
            AssetCell::ZERO
        });
        if assets.insert(asset.to_string(), cell).is_some() {
            return Err(anyhow!("Asset {} given more than once", asset));
        }
    }
    Ok(assets)
}

pub fn dispatch_record(settings: &Settings, date: &str, cells: &[String]) -> Result<()> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}'. Use YYYY-MM-DD format.", date))?;
    let assets = parse_cells(cells, settings.bare_price)?;
    let snapshot = Snapshot::new(date, assets);
    let total_value = snapshot.total_value;

    let recorded = history::upsert_snapshot(&settings.history_file, &snapshot)?;

    if settings.json {
        let payload = serde_json::json!({
            "date": date,
            "recorded": recorded,
            "total_value": total_value,
            "history_file": settings.history_file,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if recorded {
        println!(
            "{} Recorded {} total {} in {}",
            "✓".green().bold(),
            date,
            format_currency(total_value).cyan(),
            settings.history_file.display()
        );
    } else {
        println!(
            "{} Snapshot for {} already exists in {}; not recorded again",
            "ℹ".blue().bold(),
            date,
            settings.history_file.display()
        );
    }
    Ok(())
}
