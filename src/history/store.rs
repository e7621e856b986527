//! CSV history file: one row per date, one column per asset, plus `total_value`.
//!
//! The stored total is written for human readers and ignored on load.

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info, warn};

use super::{format_cell, normalize, BarePricePolicy, RawRow, Series, Snapshot};
use crate::error::FolioError;

const DATE_COLUMN: &str = "date";
const TOTAL_COLUMN: &str = "total_value";

/// Load and normalize a history file.
pub fn read_history<P: AsRef<Path>>(path: P, policy: BarePricePolicy) -> Result<Series> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(FolioError::HistoryNotFound(path.to_path_buf()).into());
    }
    info!("Loading history from {:?}", path);

    let file = fs::File::open(path).context("Failed to open history file")?;
    let series = read_history_from(file, policy)
        .with_context(|| format!("Failed to read history {}", path.display()))?;

    info!("Loaded {} snapshots", series.len());
    Ok(series)
}

/// Load and normalize history rows from any CSV source.
pub fn read_history_from<R: Read>(reader: R, policy: BarePricePolicy) -> Result<Series> {
    let mut reader = ReaderBuilder::new()
        .flexible(true) // Hand-edited rows may be short
        .from_reader(reader);

    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .clone();
    let layout = ColumnLayout::from_headers(&headers)?;
    debug!("History columns: {:?}", layout);

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.context("Failed to read CSV record")?;
        match layout.parse_row(&record) {
            Some(row) => rows.push(row),
            None => warn!("Skipping row {}: unreadable date", idx + 2),
        }
    }

    Ok(normalize(&rows, policy)?)
}

#[derive(Debug)]
struct ColumnLayout {
    date: usize,
    assets: Vec<(usize, String)>,
}

impl ColumnLayout {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let mut date = None;
        let mut assets = Vec::new();

        for (idx, header) in headers.iter().enumerate() {
            let name = header.trim();
            if name.eq_ignore_ascii_case(DATE_COLUMN) {
                date = Some(idx);
            } else if name.eq_ignore_ascii_case(TOTAL_COLUMN) || name.is_empty() {
                continue;
            } else {
                assets.push((idx, name.to_string()));
            }
        }

        Ok(Self {
            date: date.ok_or_else(|| anyhow!("Date column not found"))?,
            assets,
        })
    }

    fn parse_row(&self, record: &StringRecord) -> Option<RawRow> {
        let date = parse_date(record.get(self.date)?)?;
        let mut row = RawRow::new(date);
        for (idx, asset) in &self.assets {
            // Blank cells mean the position did not exist that day
            match record.get(*idx).map(str::trim) {
                Some(raw) if !raw.is_empty() => row.cells.push((asset.clone(), raw.to_string())),
                _ => {}
            }
        }
        Some(row)
    }
}

/// Dates are `YYYY-MM-DD`; a trailing time component is tolerated.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| raw.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
}

/// Write a series as a history file, replacing any previous content.
///
/// Asset columns that are zero on every date are dropped.
pub fn write_history<P: AsRef<Path>>(path: P, series: &Series) -> Result<()> {
    let path = path.as_ref();
    let mut buffer = Vec::new();
    write_history_to(&mut buffer, series)?;
    replace_file(path, &buffer)?;

    info!("Wrote {} snapshots to {:?}", series.len(), path);
    Ok(())
}

pub fn write_history_to<W: Write>(writer: W, series: &Series) -> Result<()> {
    let assets: Vec<String> = series
        .asset_ids()
        .into_iter()
        .filter(|asset| series.iter().any(|s| !s.cell(asset).is_zero()))
        .collect();

    let mut wtr = WriterBuilder::new().from_writer(writer);

    let mut header = vec![DATE_COLUMN.to_string()];
    header.extend(assets.iter().cloned());
    header.push(TOTAL_COLUMN.to_string());
    wtr.write_record(&header)?;

    for snapshot in series {
        wtr.write_record(snapshot_record(&header, snapshot))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Record one snapshot, at most once per date.
///
/// Returns `false` without touching the file when the date is already present.
/// Otherwise one row is appended under the file's own header. Assets the
/// header lacks become new trailing columns; every existing row is kept
/// byte for byte, including rows and cells the loader would skip.
pub fn upsert_snapshot<P: AsRef<Path>>(path: P, snapshot: &Snapshot) -> Result<bool> {
    let path = path.as_ref();
    let text = if path.exists() {
        fs::read_to_string(path).context("Failed to read history file")?
    } else {
        String::new()
    };

    if text.trim().is_empty() {
        let mut header = vec![DATE_COLUMN.to_string()];
        header.extend(snapshot.assets.keys().cloned());
        header.push(TOTAL_COLUMN.to_string());

        let mut buffer = csv_line(&header)?;
        buffer.push_str(&csv_line(&snapshot_record(&header, snapshot))?);
        replace_file(path, buffer.as_bytes())?;
        info!("Started history {:?} at {}", path, snapshot.date);
        return Ok(true);
    }

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .clone();
    let layout = ColumnLayout::from_headers(&headers)?;

    for result in reader.records() {
        let record = result.context("Failed to read CSV record")?;
        let recorded = record
            .get(layout.date)
            .and_then(parse_date)
            .is_some_and(|date| date == snapshot.date);
        if recorded {
            info!(
                "Snapshot for {} already recorded in {:?}; skipping",
                snapshot.date, path
            );
            return Ok(false);
        }
    }

    let new_assets: Vec<String> = snapshot
        .assets
        .keys()
        .filter(|asset| !layout.assets.iter().any(|(_, name)| name == *asset))
        .cloned()
        .collect();

    let (header_line, body) = match text.find('\n') {
        Some(idx) => text.split_at(idx),
        None => (text.as_str(), ""),
    };
    let (header_core, line_end) = match header_line.strip_suffix('\r') {
        Some(core) => (core, "\r"),
        None => (header_line, ""),
    };

    let mut buffer = String::from(header_core);
    if !new_assets.is_empty() {
        debug!("Adding history columns: {:?}", new_assets);
        buffer.push(',');
        buffer.push_str(csv_line(&new_assets)?.trim_end());
    }
    buffer.push_str(line_end);
    buffer.push_str(body);
    if !buffer.ends_with('\n') {
        buffer.push_str(line_end);
        buffer.push('\n');
    }

    let mut columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
    columns.extend(new_assets);
    let row = csv_line(&snapshot_record(&columns, snapshot))?;
    buffer.push_str(row.trim_end());
    buffer.push_str(line_end);
    buffer.push('\n');

    replace_file(path, buffer.as_bytes())?;
    info!("Appended {} to {:?}", snapshot.date, path);
    Ok(true)
}

/// Cells for one snapshot in `columns` order; absent assets stay blank.
fn snapshot_record(columns: &[String], snapshot: &Snapshot) -> Vec<String> {
    columns
        .iter()
        .map(|column| {
            if column.eq_ignore_ascii_case(DATE_COLUMN) {
                snapshot.date.format("%Y-%m-%d").to_string()
            } else if column.eq_ignore_ascii_case(TOTAL_COLUMN) {
                format!("{:.2}", snapshot.total_value)
            } else {
                snapshot
                    .assets
                    .get(column)
                    .map(format_cell)
                    .unwrap_or_default()
            }
        })
        .collect()
}

fn csv_line(fields: &[String]) -> Result<String> {
    let mut wtr = WriterBuilder::new().from_writer(Vec::new());
    wtr.write_record(fields)?;
    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow!("Failed to encode CSV row: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Replace `path` atomically through a sibling temp file.
fn replace_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create history directory")?;
    }
    let tmp_path = path.with_extension("csv.tmp");
    fs::write(&tmp_path, contents).context("Failed to write history file")?;
    fs::rename(&tmp_path, path).context("Failed to finalize history file")?;
    Ok(())
}
