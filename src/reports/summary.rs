//! Report records handed to file writers and dashboards.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use super::performance::{PeriodResult, StandardPeriod};

/// One period of the serialized report. Dates serialize as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodReport {
    pub period_name: String,
    pub actual_start_date: NaiveDate,
    pub actual_end_date: NaiveDate,
    pub trading_days: usize,
    pub start_value: f64,
    pub end_value: f64,
    pub net_cash_flow: f64,
    pub market_gain: f64,
    pub growth: f64,
    pub return_rate: f64,
}

impl PeriodReport {
    /// Display label for standard periods, the raw name otherwise.
    pub fn label(&self) -> &str {
        match StandardPeriod::from_key(&self.period_name) {
            Some(standard) => standard.label(),
            None => &self.period_name,
        }
    }
}

impl From<PeriodResult> for PeriodReport {
    fn from(r: PeriodResult) -> Self {
        Self {
            period_name: r.period_name,
            actual_start_date: r.actual_start_date,
            actual_end_date: r.actual_end_date,
            trading_days: r.trading_days,
            start_value: r.start_value,
            end_value: r.end_value,
            net_cash_flow: r.net_cash_flow,
            market_gain: r.market_gain,
            growth: r.growth,
            return_rate: r.return_rate,
        }
    }
}

/// Order results canonically: standard periods first in their fixed order,
/// then any other periods in the order given.
pub fn assemble(results: Vec<PeriodResult>) -> Vec<PeriodReport> {
    let mut reports: Vec<PeriodReport> = results.into_iter().map(PeriodReport::from).collect();
    reports.sort_by_key(|r| {
        StandardPeriod::from_key(&r.period_name)
            .map(StandardPeriod::rank)
            .unwrap_or(StandardPeriod::ALL.len())
    });
    reports
}

/// Compact per-period entry read by the dashboard page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontendEntry {
    pub period: String,
    #[serde(rename = "return")]
    pub return_rate: f64,
    pub profit: f64,
    pub growth: f64,
}

pub fn frontend_entries(reports: &[PeriodReport]) -> Vec<FrontendEntry> {
    reports
        .iter()
        .map(|r| FrontendEntry {
            period: r.period_name.clone(),
            return_rate: r.return_rate,
            profit: r.market_gain,
            growth: r.growth,
        })
        .collect()
}

/// Write any report payload as pretty JSON.
pub fn write_json<P: AsRef<Path>, T: Serialize + ?Sized>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote report to {:?}", path);
    Ok(())
}
