//! Error handling for folio
//!
//! Defines custom error types and establishes a unified Result type
//! using anyhow for context chaining and error propagation.
//!
//! The return engine itself never fails: malformed cells degrade to zero
//! cells and unobservable periods come back as `None`. These errors only
//! surface from the collaborators around it (history files, config, CLI input).

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Core error types for history and report operations
#[derive(Error, Debug)]
pub enum FolioError {
    #[error("history file not found: {}", .0.display())]
    HistoryNotFound(PathBuf),

    #[error("duplicate snapshot date: {0}")]
    DuplicateDate(NaiveDate),

    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Result type alias for folio operations
pub type Result<T> = anyhow::Result<T>;
