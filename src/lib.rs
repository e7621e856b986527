//! Folio - portfolio snapshot tracker
//!
//! This library normalizes daily portfolio snapshots, decomposes each day's
//! value change into market gain and inferred cash flow, and aggregates the
//! result into time-weighted returns for standard reporting periods.

pub mod config;
pub mod error;
pub mod history;
pub mod reports;
pub mod utils;
