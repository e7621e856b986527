//! Report, flows and period command handlers

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use super::Settings;
use crate::cli::formatters;
use folio::reports;

pub fn dispatch_report(settings: &Settings, output: Option<PathBuf>) -> Result<()> {
    let annotated = settings.load_annotated()?;
    let periods = reports::standard_periods(annotated.series());
    let results = reports::calculate_periods(&annotated, &periods, settings.return_method);
    let report = reports::assemble(results);

    if let Some(path) = output {
        reports::write_json(&path, &reports::frontend_entries(&report))?;
    }

    if settings.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.is_empty() {
        print!("{}", formatters::format_no_data("any period"));
    } else {
        if let Some(last) = annotated.series().last() {
            println!("Periods are measured up to the latest recorded date: {}", last.date);
        }
        println!(
            "{}",
            formatters::format_report_table(&report, settings.return_method)
        );
    }
    Ok(())
}

pub fn dispatch_flows(settings: &Settings, tail: usize) -> Result<()> {
    let annotated = settings.load_annotated()?;
    let flows = annotated.flows();
    let recent = &flows[flows.len().saturating_sub(tail)..];
    info!("Showing {} of {} daily flows", recent.len(), flows.len());

    if settings.json {
        println!("{}", serde_json::to_string_pretty(recent)?);
    } else if flows.is_empty() {
        print!("{}", formatters::format_no_data("daily flows (need two snapshots)"));
    } else if recent.is_empty() {
        let what = format!("the last {} of {} daily flows", tail, flows.len());
        print!("{}", formatters::format_no_data(&what));
    } else {
        println!("{}", formatters::format_flows_table(recent));
    }
    Ok(())
}

pub fn dispatch_period(settings: &Settings, spec: &str) -> Result<()> {
    let annotated = settings.load_annotated()?;
    let result = reports::parse_period_spec(spec, annotated.series())?
        .and_then(|period| reports::calculate_period(&annotated, &period, settings.return_method))
        .map(reports::PeriodReport::from);

    if settings.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    match result {
        Some(report) => println!(
            "{}",
            formatters::format_period_detail(&report, settings.return_method)
        ),
        None => print!("{}", formatters::format_no_data(spec)),
    }
    Ok(())
}
