//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation.

use colored::Colorize;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use folio::reports::{DailyFlow, PeriodReport, ReturnMethod};
use folio::utils::{format_currency, format_percent};

fn signed_currency(value: f64) -> String {
    let text = format_currency(value);
    if value < 0.0 {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

fn signed_percent(rate: f64) -> String {
    let text = format_percent(rate);
    if rate < 0.0 {
        text.red().to_string()
    } else {
        text.green().to_string()
    }
}

fn method_label(method: ReturnMethod) -> &'static str {
    match method {
        ReturnMethod::TimeWeighted => "Return (TWRR)",
        ReturnMethod::SimpleRatio => "Return (ratio)",
    }
}

/// Format period results for terminal table output
pub fn format_report_table(reports: &[PeriodReport], method: ReturnMethod) -> String {
    #[derive(Tabled)]
    struct PeriodRow {
        #[tabled(rename = "Period")]
        period: String,
        #[tabled(rename = "Start")]
        start: String,
        #[tabled(rename = "End")]
        end: String,
        #[tabled(rename = "Days")]
        days: usize,
        #[tabled(rename = "Start Value")]
        start_value: String,
        #[tabled(rename = "End Value")]
        end_value: String,
        #[tabled(rename = "Inferred Flow")]
        flow: String,
        #[tabled(rename = "Profit")]
        profit: String,
        #[tabled(rename = "Growth")]
        growth: String,
        #[tabled(rename = "Return")]
        return_rate: String,
    }

    let rows: Vec<PeriodRow> = reports
        .iter()
        .map(|r| PeriodRow {
            period: r.label().to_string(),
            start: r.actual_start_date.format("%Y-%m-%d").to_string(),
            end: r.actual_end_date.format("%Y-%m-%d").to_string(),
            days: r.trading_days,
            start_value: format_currency(r.start_value),
            end_value: format_currency(r.end_value),
            flow: format_currency(r.net_cash_flow),
            profit: signed_currency(r.market_gain),
            growth: signed_currency(r.growth),
            return_rate: signed_percent(r.return_rate),
        })
        .collect();

    let mut output = format!("\n{} Portfolio Returns\n\n", "📈".cyan().bold());

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    // Right-align everything after the dates
    table.modify(Columns::new(3..), Alignment::right());
    output.push_str(&table.to_string());

    output.push_str(&format!("\n\n{}", "━".repeat(80).bright_black()));
    output.push_str(&format!(
        "\n{:<16} {}",
        "Return:".bold(),
        match method {
            ReturnMethod::TimeWeighted =>
                "time-weighted; excludes the effect of cash flow timing and size",
            ReturnMethod::SimpleRatio => "profit / (start value + inferred flow)",
        }
    ));
    output.push_str(&format!(
        "\n{:<16} value change after subtracting inferred cash flow",
        "Profit:".bold()
    ));
    output.push_str(&format!(
        "\n{:<16} raw value change, cash flow included\n",
        "Growth:".bold()
    ));

    output
}

/// Format one period's figures as a detail block
pub fn format_period_detail(report: &PeriodReport, method: ReturnMethod) -> String {
    let mut output = format!("\n{} {}\n", "📈".cyan().bold(), report.label().bold());
    output.push_str(&format!(
        "  Period: {} → {} ({} trading days)\n\n",
        report.actual_start_date, report.actual_end_date, report.trading_days
    ));
    output.push_str(&format!(
        "  Start Value:      {}\n",
        format_currency(report.start_value).cyan()
    ));
    output.push_str(&format!(
        "  End Value:        {}\n",
        format_currency(report.end_value).cyan()
    ));
    output.push_str(&format!(
        "  Inferred Flow:    {}\n",
        format_currency(report.net_cash_flow)
    ));
    output.push_str(&format!("  Profit:           {}\n", signed_currency(report.market_gain)));
    output.push_str(&format!("  Growth:           {}\n", signed_currency(report.growth)));
    output.push_str(&format!(
        "  {:<17} {}\n",
        format!("{}:", method_label(method)),
        signed_percent(report.return_rate)
    ));
    output
}

/// Format daily decompositions for terminal table output
pub fn format_flows_table(flows: &[DailyFlow]) -> String {
    #[derive(Tabled)]
    struct FlowRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Total Value")]
        total: String,
        #[tabled(rename = "Investment Gain")]
        gain: String,
        #[tabled(rename = "Inferred Flow")]
        flow: String,
        #[tabled(rename = "Daily Return")]
        daily_return: String,
    }

    let rows: Vec<FlowRow> = flows
        .iter()
        .map(|f| FlowRow {
            date: f.date.format("%Y-%m-%d").to_string(),
            total: format_currency(f.end_value),
            gain: signed_currency(f.investment_gain),
            flow: format_currency(f.inferred_cash_flow),
            daily_return: signed_percent(f.daily_return),
        })
        .collect();

    let mut output = format!("\n{} Daily Decomposition\n\n", "📊".cyan().bold());
    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());
    output.push_str(&table.to_string());
    output.push('\n');
    output
}

/// Message for histories too short to produce a result
pub fn format_no_data(what: &str) -> String {
    format!(
        "{} No data for {}\nRecord snapshots first using: {} record <date> <ASSET=(value|price)>...\n",
        "ℹ".blue().bold(),
        what,
        "folio".bold()
    )
}
