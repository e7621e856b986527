//! Day-over-day decomposition of value changes into market gain and
//! inferred cash flow.
//!
//! There is no trade log. For each pair of consecutive snapshots the held
//! quantity of every priced asset is inferred from yesterday's value and
//! price, and repriced at today's price. Whatever part of today's total that
//! projection does not explain is attributed to external cash flow (deposits,
//! withdrawals, or trades that do not net out).

use chrono::NaiveDate;
use itertools::Itertools;
use serde::Serialize;

use crate::history::{Series, Snapshot};

/// Start values at or below this magnitude produce a zero daily return.
pub const RETURN_EPSILON: f64 = 1e-6;

/// Decomposition of one day's value change.
///
/// `investment_gain + inferred_cash_flow == end_value - start_value`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyFlow {
    pub date: NaiveDate,
    /// Previous snapshot's total
    pub start_value: f64,
    /// Previous holdings repriced at today's prices
    pub expected_value: f64,
    /// This snapshot's total
    pub end_value: f64,
    pub investment_gain: f64,
    pub inferred_cash_flow: f64,
    pub daily_return: f64,
}

/// Decompose the move from `prev` to `curr`.
pub fn decompose_day(prev: &Snapshot, curr: &Snapshot) -> DailyFlow {
    let start_value = prev.total_value;
    let end_value = curr.total_value;

    let expected_value: f64 = prev
        .assets
        .keys()
        .chain(curr.assets.keys())
        .unique()
        .map(|asset| {
            let before = prev.cell(asset);
            let after = curr.cell(asset);
            if before.is_priced() && after.is_priced() {
                let quantity = before.value / before.price;
                quantity * after.price
            } else {
                // Unpriced (cash, missing data): carried forward unchanged
                before.value
            }
        })
        .sum();

    let investment_gain = expected_value - start_value;
    let inferred_cash_flow = end_value - expected_value;
    let daily_return = if start_value.abs() > RETURN_EPSILON {
        investment_gain / start_value
    } else {
        0.0
    };

    DailyFlow {
        date: curr.date,
        start_value,
        expected_value,
        end_value,
        investment_gain,
        inferred_cash_flow,
        daily_return,
    }
}

/// One flow per snapshot after the first, in date order.
pub fn decompose(series: &Series) -> Vec<DailyFlow> {
    series
        .snapshots()
        .windows(2)
        .map(|pair| decompose_day(&pair[0], &pair[1]))
        .collect()
}

/// A series together with its daily flows, computed once.
#[derive(Debug, Clone)]
pub struct AnnotatedSeries {
    series: Series,
    flows: Vec<DailyFlow>,
}

impl AnnotatedSeries {
    pub fn new(series: Series) -> Self {
        let flows = decompose(&series);
        Self { series, flows }
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    pub fn flows(&self) -> &[DailyFlow] {
        &self.flows
    }

    /// The flow ending at snapshot `index`; the first snapshot has none.
    pub fn flow_at(&self, index: usize) -> Option<&DailyFlow> {
        index.checked_sub(1).and_then(|i| self.flows.get(i))
    }

    /// Flows ending at snapshots `from..=to`, skipping the first snapshot.
    pub fn flows_between(&self, from: usize, to: usize) -> &[DailyFlow] {
        let start = from.max(1) - 1;
        let end = to.min(self.flows.len());
        if start >= end {
            &[]
        } else {
            &self.flows[start..end]
        }
    }
}
