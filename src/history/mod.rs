//! Portfolio history: per-date asset cells normalized into an ordered series.
//!
//! Raw history rows carry one text cell per asset, either the encoded pair
//! `(value|price)` or a bare number, plus a stored total that is never trusted.
//! Normalization turns each row into a [`Snapshot`] whose `total_value` is the
//! sum of its parsed asset values.

pub mod store;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::FolioError;

pub use store::{read_history, read_history_from, upsert_snapshot, write_history, write_history_to};

/// One asset's state on one date.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AssetCell {
    /// Market value of the position that date
    pub value: f64,
    /// Per-unit price that date; `<= 0` means unknown (cash-like assets)
    pub price: f64,
}

impl AssetCell {
    pub const ZERO: AssetCell = AssetCell {
        value: 0.0,
        price: 0.0,
    };

    pub fn new(value: f64, price: f64) -> Self {
        Self { value, price }
    }

    /// A held quantity can only be inferred from a positive price.
    pub fn is_priced(&self) -> bool {
        self.price > 0.0
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0.0 && self.price == 0.0
    }
}

/// Price assigned to bare numeric cells, which carry a value but no price.
///
/// Older history rows stored plain numbers (and cash is still stored that
/// way). `Unit` treats the number as `value` units priced at `1.0`, so a
/// bare cell whose value changes between two priced days is read as a market
/// move. `Unknown` leaves the price at `0.0`, so the cell is carried forward
/// unchanged and any change lands in the inferred cash flow instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarePricePolicy {
    #[default]
    Unit,
    Unknown,
}

impl BarePricePolicy {
    pub fn implied_price(self) -> f64 {
        match self {
            BarePricePolicy::Unit => 1.0,
            BarePricePolicy::Unknown => 0.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BarePricePolicy::Unit => "unit",
            BarePricePolicy::Unknown => "unknown",
        }
    }
}

impl FromStr for BarePricePolicy {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unit" | "one" | "1" => Ok(BarePricePolicy::Unit),
            "unknown" | "zero" | "0" => Ok(BarePricePolicy::Unknown),
            other => Err(FolioError::Config(format!(
                "invalid bare price policy '{}'. Use: unit or unknown",
                other
            ))),
        }
    }
}

impl fmt::Display for BarePricePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a history cell into an [`AssetCell`].
///
/// Accepts `(value|price)` (whitespace around either number is fine) or a
/// bare number. Anything else, including empty text and non-finite numbers,
/// yields [`AssetCell::ZERO`].
///
/// # Examples
/// ```
/// use folio::history::{parse_cell, AssetCell, BarePricePolicy};
///
/// assert_eq!(
///     parse_cell("(45957.60|353.52)", BarePricePolicy::Unit),
///     AssetCell::new(45957.60, 353.52)
/// );
/// assert_eq!(parse_cell("1500", BarePricePolicy::Unit), AssetCell::new(1500.0, 1.0));
/// assert_eq!(parse_cell("1500", BarePricePolicy::Unknown), AssetCell::new(1500.0, 0.0));
/// assert_eq!(parse_cell("(12|abc)", BarePricePolicy::Unit), AssetCell::ZERO);
/// ```
pub fn parse_cell(raw: &str, policy: BarePricePolicy) -> AssetCell {
    try_parse_cell(raw, policy).unwrap_or(AssetCell::ZERO)
}

/// Like [`parse_cell`], but `None` for text that is not a well-formed cell.
///
/// An explicit zero such as `(0|0)` or `0` is well formed.
pub fn try_parse_cell(raw: &str, policy: BarePricePolicy) -> Option<AssetCell> {
    let text = raw.trim();

    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        let (value, price) = inner.split_once('|')?;
        return Some(AssetCell::new(parse_number(value)?, parse_number(price)?));
    }

    parse_number(text).map(|value| AssetCell::new(value, policy.implied_price()))
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Encode a cell the way history files store it: `(value|price)`.
///
/// Numbers are written at full precision so a re-read cell infers the same
/// quantity.
pub fn format_cell(cell: &AssetCell) -> String {
    format!("({}|{})", cell.value, cell.price)
}

/// One unparsed history row: a date and its raw asset cells.
///
/// The stored total column is deliberately not part of a row.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub date: NaiveDate,
    pub cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            cells: Vec::new(),
        }
    }

    pub fn with_cell(mut self, asset: impl Into<String>, raw: impl Into<String>) -> Self {
        self.cells.push((asset.into(), raw.into()));
        self
    }
}

/// One date's full portfolio state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub date: NaiveDate,
    /// Always the sum of `assets` values
    pub total_value: f64,
    pub assets: BTreeMap<String, AssetCell>,
}

impl Snapshot {
    pub fn new(date: NaiveDate, assets: BTreeMap<String, AssetCell>) -> Self {
        let total_value = assets.values().map(|c| c.value).sum();
        Self {
            date,
            total_value,
            assets,
        }
    }

    pub fn from_row(row: &RawRow, policy: BarePricePolicy) -> Self {
        let assets = row
            .cells
            .iter()
            .map(|(asset, raw)| (asset.clone(), parse_cell(raw, policy)))
            .collect();
        Self::new(row.date, assets)
    }

    /// The asset's cell, or a zero cell when the position is absent that day.
    pub fn cell(&self, asset: &str) -> AssetCell {
        self.assets.get(asset).copied().unwrap_or(AssetCell::ZERO)
    }
}

/// Date-ascending, duplicate-free sequence of snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    snapshots: Vec<Snapshot>,
}

impl Series {
    /// Sort snapshots by date; two snapshots on the same date are rejected.
    pub fn new(mut snapshots: Vec<Snapshot>) -> Result<Self, FolioError> {
        snapshots.sort_by_key(|s| s.date);
        if let Some(pair) = snapshots.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(FolioError::DuplicateDate(pair[0].date));
        }
        Ok(Self { snapshots })
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    pub fn first(&self) -> Option<&Snapshot> {
        self.snapshots.first()
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.snapshots.iter()
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.snapshots.iter().map(|s| s.date).collect()
    }

    /// Index of the first snapshot dated on or after `date`.
    pub fn lower_bound(&self, date: NaiveDate) -> usize {
        self.snapshots.partition_point(|s| s.date < date)
    }

    /// Index one past the last snapshot dated on or before `date`.
    pub fn upper_bound(&self, date: NaiveDate) -> usize {
        self.snapshots.partition_point(|s| s.date <= date)
    }

    /// Every asset id seen anywhere in the history, sorted.
    pub fn asset_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .snapshots
            .iter()
            .flat_map(|s| s.assets.keys().cloned())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}

/// Normalize raw rows into a series, recomputing every total.
pub fn normalize(rows: &[RawRow], policy: BarePricePolicy) -> Result<Series, FolioError> {
    Series::new(rows.iter().map(|row| Snapshot::from_row(row, policy)).collect())
}
