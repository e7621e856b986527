use assert_cmd::assert::OutputAssertExt;
use anyhow::Result;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

use cli_helpers::{approx, base_cmd, find_period, fixture, report_json, run_cmd, run_cmd_json};

fn setup_temp_home() -> TempDir {
    TempDir::new().expect("failed to create temp home")
}

#[test]
fn report_json_lists_standard_periods_in_order() -> Result<()> {
    let home = setup_temp_home();
    let reports = report_json(&home, &fixture("history_basic.csv"), &[])?;

    let names: Vec<&str> = reports
        .iter()
        .map(|r| r["period_name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "previous_trading_day",
            "week_to_date",
            "month_to_date",
            "year_to_date",
            "past_30_trading_days",
            "past_250_trading_days",
        ]
    );

    let prev = find_period(&reports, "previous_trading_day");
    assert_eq!(prev["actual_start_date"], "2025-01-07");
    assert_eq!(prev["trading_days"], 1);
    assert!(approx(&prev["start_value"], 2020.0));
    assert!(approx(&prev["end_value"], 2008.5));
    assert!(approx(&prev["return_rate"], -11.5 / 2020.0));

    // 2025-01-07 is a Tuesday: the week opens on Monday 2025-01-06
    let wtd = find_period(&reports, "week_to_date");
    assert_eq!(wtd["actual_start_date"], "2025-01-06");
    assert!(approx(&wtd["start_value"], 1810.0));
    assert!(approx(&wtd["net_cash_flow"], 150.0));
    assert!(approx(&wtd["market_gain"], 48.5));
    assert!(approx(&wtd["growth"], 198.5));

    // Window opens on the first snapshot: its funding is not a flow
    let mtd = find_period(&reports, "month_to_date");
    assert_eq!(mtd["actual_start_date"], "2025-01-02");
    assert_eq!(mtd["trading_days"], 4);
    assert!(approx(&mtd["start_value"], 1700.0));
    assert!(approx(&mtd["net_cash_flow"], 150.0));
    assert!(approx(&mtd["market_gain"], 158.5));
    let twrr = (1.0 + 110.0 / 1700.0) * (1.0 + 60.0 / 1810.0) * (1.0 - 11.5 / 2020.0) - 1.0;
    assert!(approx(&mtd["return_rate"], twrr));
    Ok(())
}

#[test]
fn report_table_without_color_when_requested() {
    let home = setup_temp_home();
    let mut cmd = base_cmd(&home);
    cmd.arg("--history")
        .arg(fixture("history_basic.csv"))
        .arg("report");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Week to date"))
        .stdout(predicate::str::contains("2025-01-07"))
        .stdout(predicate::str::contains("$2,008.50"))
        .stdout(predicate::str::contains("\u{001b}[").not());
}

#[test]
fn missing_history_fails_with_message() {
    let home = setup_temp_home();
    let mut cmd = base_cmd(&home);
    cmd.arg("--history")
        .arg(home.path().join("absent.csv"))
        .arg("report");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("history file not found"));
}

#[test]
fn bare_price_policy_changes_legacy_results() -> Result<()> {
    let home = setup_temp_home();
    let legacy = fixture("history_legacy.csv");

    let unit = report_json(&home, &legacy, &["--bare-price", "unit"])?;
    let unknown = report_json(&home, &legacy, &["--bare-price", "unknown"])?;

    let ytd_unit = find_period(&unit, "year_to_date");
    let ytd_unknown = find_period(&unknown, "year_to_date");

    assert!(approx(&ytd_unit["return_rate"], 1.2));
    assert!(approx(&ytd_unit["net_cash_flow"], -1110.0));
    assert!(approx(&ytd_unknown["return_rate"], 0.0));
    assert!(approx(&ytd_unknown["net_cash_flow"], 210.0));
    // Growth never depends on the policy
    assert!(approx(&ytd_unit["growth"], 210.0));
    assert!(approx(&ytd_unknown["growth"], 210.0));
    Ok(())
}

#[test]
fn ratio_method_is_opt_in() -> Result<()> {
    let home = setup_temp_home();
    let history = fixture("history_basic.csv");

    let twrr = report_json(&home, &history, &[])?;
    let ratio = report_json(&home, &history, &["--method", "ratio"])?;

    let mtd_ratio = find_period(&ratio, "month_to_date");
    assert!(approx(&mtd_ratio["return_rate"], 158.5 / 1850.0));
    assert_ne!(
        find_period(&twrr, "month_to_date")["return_rate"],
        mtd_ratio["return_rate"]
    );
    Ok(())
}

#[test]
fn report_output_writes_dashboard_json() -> Result<()> {
    let home = setup_temp_home();
    let out = home.path().join("portfolio_return.json");
    let history = fixture("history_basic.csv");

    run_cmd(
        &home,
        &[
            "--history",
            history.to_str().unwrap(),
            "report",
            "--output",
            out.to_str().unwrap(),
        ],
    )?;

    let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out)?)?;
    let entries = written.as_array().unwrap();
    assert_eq!(entries.len(), 6);
    assert_eq!(entries[0]["period"], "previous_trading_day");
    assert!(entries[0].get("return").is_some());
    assert!(entries[0].get("profit").is_some());
    assert!(entries[0].get("growth").is_some());
    Ok(())
}

#[test]
fn config_file_supplies_history_and_method() -> Result<()> {
    let home = setup_temp_home();
    let config = home.path().join("folio.toml");
    fs::write(
        &config,
        format!(
            "history_file = {:?}\nreturn_method = \"simple_ratio\"\n",
            fixture("history_basic.csv").to_string_lossy()
        ),
    )?;

    let value = run_cmd_json(
        &home,
        &["--config", config.to_str().unwrap(), "period", "mtd"],
    )?;
    assert_eq!(value["period_name"], "month_to_date");
    assert!(approx(&value["return_rate"], 158.5 / 1850.0));
    Ok(())
}

#[test]
fn period_outside_history_reports_no_data() {
    let home = setup_temp_home();
    let mut cmd = base_cmd(&home);
    cmd.arg("--history")
        .arg(fixture("history_basic.csv"))
        .arg("period")
        .arg("2024");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No data for 2024"));
}

#[test]
fn invalid_period_is_an_error() {
    let home = setup_temp_home();
    let mut cmd = base_cmd(&home);
    cmd.arg("--history")
        .arg(fixture("history_basic.csv"))
        .arg("period")
        .arg("qtd");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid period"));
}

#[test]
fn record_then_flows_round_trip() -> Result<()> {
    let home = setup_temp_home();
    let history = home.path().join("history.csv");
    let history_arg = history.to_str().unwrap();

    let first = run_cmd_json(
        &home,
        &["--history", history_arg, "record", "2025-01-02", "A=(1000|100)"],
    )?;
    assert_eq!(first["recorded"], true);

    let again = run_cmd_json(
        &home,
        &["--history", history_arg, "record", "2025-01-02", "A=(5|1)"],
    )?;
    assert_eq!(again["recorded"], false);

    run_cmd(
        &home,
        &[
            "--history",
            history_arg,
            "record",
            "2025-01-03",
            "A=(1100|110)",
            "CASH=250",
        ],
    )?;

    let flows = run_cmd_json(&home, &["--history", history_arg, "flows"])?;
    let flows = flows.as_array().unwrap();
    assert_eq!(flows.len(), 1);
    assert_eq!(flows[0]["date"], "2025-01-03");
    assert!(approx(&flows[0]["investment_gain"], 100.0));
    assert!(approx(&flows[0]["inferred_cash_flow"], 250.0));
    assert!(approx(&flows[0]["daily_return"], 0.1));

    let text = fs::read_to_string(&history)?;
    assert!(text.starts_with("date,A,total_value,CASH\n2025-01-02,(1000|100),1000.00\n"));
    assert!(text.ends_with("2025-01-03,(1100|110),1350.00,(250|1)\n"));
    Ok(())
}

#[test]
fn single_snapshot_history_has_no_flows() {
    let home = setup_temp_home();
    let history = home.path().join("one.csv");
    fs::write(&history, "date,A\n2025-01-02,(10|1)\n").unwrap();

    let mut cmd = base_cmd(&home);
    cmd.arg("--history").arg(&history).arg("flows");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No data for daily flows"));
}

#[test]
fn record_into_hand_kept_history_only_appends() -> Result<()> {
    let home = setup_temp_home();
    let history = home.path().join("history.csv");
    let history_arg = history.to_str().unwrap();
    let existing = "date,A,LEGACY,total_value\n\
2025-01-02,(1000|0.123456),500,1500\n\
2025-01-03,(1100|0.1358016),500,1600\n\
2025/01/06,(9|9),oops,0\n";
    fs::write(&history, existing)?;

    let before = run_cmd_json(
        &home,
        &["--history", history_arg, "--bare-price", "unknown", "flows"],
    )?;

    run_cmd(
        &home,
        &[
            "--history",
            history_arg,
            "--bare-price",
            "unit",
            "record",
            "2025-01-07",
            "A=(1200|0.1481472)",
        ],
    )?;

    let text = fs::read_to_string(&history)?;
    assert_eq!(
        text,
        format!("{}2025-01-07,(1200|0.1481472),,1200.00\n", existing)
    );

    let after = run_cmd_json(
        &home,
        &["--history", history_arg, "--bare-price", "unknown", "flows"],
    )?;
    let after = after.as_array().unwrap();
    assert_eq!(after.len(), 2);
    assert_eq!(after[0], before[0]);
    assert!(approx(&after[0]["investment_gain"], 100.0));
    assert!(approx(&after[0]["inferred_cash_flow"], 0.0));
    Ok(())
}

#[test]
fn missing_config_named_by_env_is_an_error() {
    let home = setup_temp_home();
    let mut cmd = base_cmd(&home);
    cmd.env("FOLIO_CONFIG", home.path().join("absent.toml"))
        .arg("--history")
        .arg(fixture("history_basic.csv"))
        .arg("report");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config"));
}

#[test]
fn flows_tail_zero_is_not_reported_as_missing_history() {
    let home = setup_temp_home();
    let mut cmd = base_cmd(&home);
    cmd.arg("--history")
        .arg(fixture("history_basic.csv"))
        .arg("flows")
        .arg("--tail")
        .arg("0");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No data for the last 0 of 3 daily flows"))
        .stdout(predicate::str::contains("need two snapshots").not());
}
