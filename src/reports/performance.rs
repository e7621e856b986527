//! Period-level returns over an annotated snapshot series.
//!
//! A [`Period`] names a calendar window. It is resolved against the recorded
//! dates (first snapshot on or after `start`, last snapshot on or before
//! `end`), and the daily flows inside the resolved window are aggregated into
//! a [`PeriodResult`].

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::FolioError;
use crate::history::Series;
use crate::reports::flows::{AnnotatedSeries, RETURN_EPSILON};

/// The reporting periods produced for every report, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardPeriod {
    PreviousDay,
    WeekToDate,
    MonthToDate,
    YearToDate,
    Trailing30,
    Trailing250,
}

impl StandardPeriod {
    pub const ALL: [StandardPeriod; 6] = [
        StandardPeriod::PreviousDay,
        StandardPeriod::WeekToDate,
        StandardPeriod::MonthToDate,
        StandardPeriod::YearToDate,
        StandardPeriod::Trailing30,
        StandardPeriod::Trailing250,
    ];

    /// Stable identifier used as the period name in reports.
    pub fn key(self) -> &'static str {
        match self {
            StandardPeriod::PreviousDay => "previous_trading_day",
            StandardPeriod::WeekToDate => "week_to_date",
            StandardPeriod::MonthToDate => "month_to_date",
            StandardPeriod::YearToDate => "year_to_date",
            StandardPeriod::Trailing30 => "past_30_trading_days",
            StandardPeriod::Trailing250 => "past_250_trading_days",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StandardPeriod::PreviousDay => "Previous trading day",
            StandardPeriod::WeekToDate => "Week to date",
            StandardPeriod::MonthToDate => "Month to date",
            StandardPeriod::YearToDate => "Year to date",
            StandardPeriod::Trailing30 => "Past 30 trading days",
            StandardPeriod::Trailing250 => "Past 250 trading days",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }

    /// Position in the canonical report order.
    pub fn rank(self) -> usize {
        Self::ALL.iter().position(|p| *p == self).unwrap_or(Self::ALL.len())
    }

    /// Window for this period, anchored on the last recorded date.
    ///
    /// `None` when the series cannot anchor it: an empty series, or a
    /// previous-day window with fewer than two snapshots.
    pub fn period(self, series: &Series) -> Option<Period> {
        let dates = series.dates();
        let last = *dates.last()?;

        let start = match self {
            StandardPeriod::PreviousDay => {
                if dates.len() < 2 {
                    return None;
                }
                last
            }
            StandardPeriod::WeekToDate => last
                .checked_sub_days(Days::new(last.weekday().num_days_from_monday() as u64))?,
            StandardPeriod::MonthToDate => last.with_day(1)?,
            StandardPeriod::YearToDate => NaiveDate::from_ymd_opt(last.year(), 1, 1)?,
            StandardPeriod::Trailing30 => trailing_start(&dates, 30),
            StandardPeriod::Trailing250 => trailing_start(&dates, 250),
        };

        Some(Period::new(self.key(), start, last))
    }
}

/// Start of a window covering the last `n` recorded dates, or all of them.
fn trailing_start(dates: &[NaiveDate], n: usize) -> NaiveDate {
    if dates.len() < n {
        dates[0]
    } else {
        dates[dates.len() - n]
    }
}

/// A named calendar window; both bounds inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Period {
    pub fn new(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }
}

/// Every standard period the series can anchor, in canonical order.
pub fn standard_periods(series: &Series) -> Vec<Period> {
    StandardPeriod::ALL
        .iter()
        .filter_map(|p| p.period(series))
        .collect()
}

/// A period resolved to snapshot indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start_loc: usize,
    pub end_loc: usize,
    pub actual_start: NaiveDate,
    pub actual_end: NaiveDate,
}

impl Window {
    pub fn trading_days(&self) -> usize {
        self.end_loc - self.start_loc + 1
    }
}

/// Resolve a period against the recorded dates.
///
/// `None` when no snapshot falls inside the window (including reversed bounds).
pub fn resolve_window(series: &Series, period: &Period) -> Option<Window> {
    let start_loc = series.lower_bound(period.start);
    let end_loc = series.upper_bound(period.end).checked_sub(1)?;

    if start_loc >= series.len() || end_loc < start_loc {
        return None;
    }

    Some(Window {
        start_loc,
        end_loc,
        actual_start: series.get(start_loc)?.date,
        actual_end: series.get(end_loc)?.date,
    })
}

/// How a period's return rate is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnMethod {
    /// Chain-linked daily returns; insensitive to cash flow size and timing
    #[default]
    TimeWeighted,
    /// `market_gain / (start_value + net_cash_flow)`, kept for comparing
    /// against reports produced before chain-linking was adopted
    SimpleRatio,
}

impl ReturnMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ReturnMethod::TimeWeighted => "time_weighted",
            ReturnMethod::SimpleRatio => "simple_ratio",
        }
    }
}

impl FromStr for ReturnMethod {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "time_weighted" | "twrr" | "twr" => Ok(ReturnMethod::TimeWeighted),
            "simple_ratio" | "ratio" => Ok(ReturnMethod::SimpleRatio),
            other => Err(FolioError::Config(format!(
                "invalid return method '{}'. Use: twrr or ratio",
                other
            ))),
        }
    }
}

impl fmt::Display for ReturnMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregated figures for one resolved period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodResult {
    pub period_name: String,
    pub actual_start_date: NaiveDate,
    pub actual_end_date: NaiveDate,
    pub trading_days: usize,
    pub start_value: f64,
    pub end_value: f64,
    pub net_cash_flow: f64,
    /// Value change attributable to the market: growth minus net cash flow
    pub market_gain: f64,
    /// Raw value change, cash flows included
    pub growth: f64,
    /// Fraction, e.g. `0.0125` for 1.25%
    pub return_rate: f64,
}

/// Aggregate one period, or `None` when the window holds no data.
///
/// When the window opens on the very first snapshot there is no prior close:
/// that snapshot's value is the baseline and its funding is not counted as an
/// in-period flow. Otherwise the baseline is the close of the snapshot just
/// before the window, so the first in-window day's flow and return count.
pub fn calculate_period(
    annotated: &AnnotatedSeries,
    period: &Period,
    method: ReturnMethod,
) -> Option<PeriodResult> {
    let series = annotated.series();
    let window = resolve_window(series, period)?;

    let baseline = window.start_loc.saturating_sub(1);
    let start_value = series.get(baseline)?.total_value;
    let end_value = series.get(window.end_loc)?.total_value;

    let flows = annotated.flows_between(window.start_loc, window.end_loc);
    let net_cash_flow: f64 = flows.iter().map(|f| f.inferred_cash_flow).sum();

    let market_gain = end_value - start_value - net_cash_flow;
    let growth = end_value - start_value;

    let return_rate = match method {
        ReturnMethod::TimeWeighted => {
            flows.iter().map(|f| 1.0 + f.daily_return).product::<f64>() - 1.0
        }
        ReturnMethod::SimpleRatio => {
            let invested = start_value + net_cash_flow;
            if invested.abs() > RETURN_EPSILON {
                market_gain / invested
            } else {
                0.0
            }
        }
    };

    Some(PeriodResult {
        period_name: period.name.clone(),
        actual_start_date: window.actual_start,
        actual_end_date: window.actual_end,
        trading_days: window.trading_days(),
        start_value,
        end_value,
        net_cash_flow,
        market_gain,
        growth,
        return_rate,
    })
}

/// Aggregate every period that resolves; the rest are left out.
pub fn calculate_periods(
    annotated: &AnnotatedSeries,
    periods: &[Period],
    method: ReturnMethod,
) -> Vec<PeriodResult> {
    periods
        .iter()
        .filter_map(|period| {
            let result = calculate_period(annotated, period, method);
            if result.is_none() {
                debug!(
                    "No data for period {} ({} → {})",
                    period.name, period.start, period.end
                );
            }
            result
        })
        .collect()
}

/// Parse a period argument.
///
/// Accepts `1d`, `wtd`, `mtd`, `ytd`, `30d`, `250d` (or the full standard
/// keys), `all`, a year `YYYY`, or `YYYY-MM-DD:YYYY-MM-DD`. Returns `Ok(None)`
/// for a standard period the series cannot anchor.
pub fn parse_period_spec(text: &str, series: &Series) -> Result<Option<Period>, FolioError> {
    let lower = text.trim().to_lowercase();

    let standard = match lower.as_str() {
        "1d" | "prev" | "previous" => Some(StandardPeriod::PreviousDay),
        "wtd" => Some(StandardPeriod::WeekToDate),
        "mtd" => Some(StandardPeriod::MonthToDate),
        "ytd" => Some(StandardPeriod::YearToDate),
        "30d" => Some(StandardPeriod::Trailing30),
        "250d" => Some(StandardPeriod::Trailing250),
        key => StandardPeriod::from_key(key),
    };
    if let Some(standard) = standard {
        return Ok(standard.period(series));
    }

    if lower == "all" {
        return Ok(match (series.first(), series.last()) {
            (Some(first), Some(last)) => Some(Period::new("since_inception", first.date, last.date)),
            _ => None,
        });
    }

    if let Ok(year) = lower.parse::<i32>() {
        if (1900..=2100).contains(&year) {
            let from = NaiveDate::from_ymd_opt(year, 1, 1)
                .ok_or_else(|| FolioError::InvalidPeriod(text.to_string()))?;
            let to = NaiveDate::from_ymd_opt(year, 12, 31)
                .ok_or_else(|| FolioError::InvalidPeriod(text.to_string()))?;
            return Ok(Some(Period::new(year.to_string(), from, to)));
        }
    }

    if let Some((from_str, to_str)) = lower.split_once(':') {
        let from = NaiveDate::parse_from_str(from_str.trim(), "%Y-%m-%d").map_err(|_| {
            FolioError::InvalidPeriod(format!("invalid from date '{}', use YYYY-MM-DD", from_str))
        })?;
        let to = NaiveDate::parse_from_str(to_str.trim(), "%Y-%m-%d").map_err(|_| {
            FolioError::InvalidPeriod(format!("invalid to date '{}', use YYYY-MM-DD", to_str))
        })?;
        return Ok(Some(Period::new(lower.clone(), from, to)));
    }

    Err(FolioError::InvalidPeriod(format!(
        "'{}'. Use: 1d, wtd, mtd, ytd, 30d, 250d, all, YYYY, or from:to (YYYY-MM-DD:YYYY-MM-DD)",
        text
    )))
}
