use anyhow::Result;
use chrono::NaiveDate;
use folio::history::{
    format_cell, normalize, parse_cell, read_history, write_history, BarePricePolicy, RawRow,
    Series,
};
use folio::reports::{
    assemble, calculate_period, calculate_periods, standard_periods, AnnotatedSeries, Period,
    ReturnMethod,
};
use tempfile::TempDir;

const TOLERANCE: f64 = 1e-9;

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
}

fn series(rows: &[(NaiveDate, &[(&str, &str)])], policy: BarePricePolicy) -> Series {
    let rows: Vec<RawRow> = rows
        .iter()
        .map(|(d, cells)| {
            cells
                .iter()
                .fold(RawRow::new(*d), |row, (asset, raw)| row.with_cell(*asset, *raw))
        })
        .collect();
    normalize(&rows, policy).unwrap()
}

#[test]
fn test_documented_three_day_scenario() {
    let s = series(
        &[
            (date(1, 6), &[("A", "(1000|100)")]),
            (date(1, 7), &[("A", "(1100|110)")]),
            (date(1, 8), &[("A", "(1150|115)"), ("CASH", "(150|0)")]),
        ],
        BarePricePolicy::Unit,
    );
    let annotated = AnnotatedSeries::new(s);
    let flows = annotated.flows();

    assert!((flows[0].investment_gain - 100.0).abs() < TOLERANCE);
    assert!(flows[0].inferred_cash_flow.abs() < TOLERANCE);
    assert!((flows[0].daily_return - 0.10).abs() < TOLERANCE);

    assert!((flows[1].expected_value - 1150.0).abs() < TOLERANCE);
    assert!((flows[1].investment_gain - 50.0).abs() < TOLERANCE);
    assert!((flows[1].inferred_cash_flow - 150.0).abs() < TOLERANCE);
    assert!((flows[1].daily_return - 0.045454545454545456).abs() < 1e-12);

    let period = Period::new("all", date(1, 6), date(1, 8));
    let result = calculate_period(&annotated, &period, ReturnMethod::TimeWeighted).unwrap();
    assert!((result.return_rate - 0.15).abs() < TOLERANCE);
    assert!((result.net_cash_flow - 150.0).abs() < TOLERANCE);
}

#[test]
fn test_deposit_on_day_two_leaves_twrr_unchanged() {
    let window = Period::new("w", date(2, 4), date(2, 6));

    let run = |day2_value: &str, day3_value: &str| {
        let s = series(
            &[
                (date(2, 3), &[("A", "(2000|20)")]),
                (date(2, 4), &[("A", "(2100|21)")]),
                (date(2, 5), &[("A", day2_value)]),
                (date(2, 6), &[("A", day3_value)]),
            ],
            BarePricePolicy::Unit,
        );
        calculate_period(&AnnotatedSeries::new(s), &window, ReturnMethod::TimeWeighted).unwrap()
    };

    // 100 units throughout vs. 1100 units bought on day 2 at the day's price
    let plain = run("(2200|22)", "(1980|19.8)");
    let deposit = run("(24200|22)", "(21780|19.8)");

    let r1 = 0.05;
    let r2 = 100.0 / 2100.0;
    let r3 = -0.1;
    let expected = (1.0 + r1) * (1.0 + r2) * (1.0 + r3) - 1.0;

    assert!((plain.return_rate - expected).abs() < 1e-9);
    assert!((deposit.return_rate - expected).abs() < 1e-9);
    assert!(plain.net_cash_flow.abs() < 1e-6);
    assert!((deposit.net_cash_flow - 22000.0).abs() < 1e-6);
    assert!(
        (deposit.market_gain - (deposit.end_value - deposit.start_value - 22000.0)).abs() < 1e-6
    );
}

#[test]
fn test_zero_flow_when_quantities_are_unchanged() {
    let s = series(
        &[
            (date(3, 3), &[("A", "(300|30)"), ("B", "(700|7)")]),
            (date(3, 4), &[("A", "(330|33)"), ("B", "(630|6.3)")]),
        ],
        BarePricePolicy::Unknown,
    );
    let flow = AnnotatedSeries::new(s).flows()[0];
    assert!(flow.inferred_cash_flow.abs() < 1e-9);
    assert!((flow.investment_gain - (-40.0)).abs() < 1e-9);
}

#[test]
fn test_degenerate_windows_are_absent_not_errors() {
    let s = series(
        &[
            (date(4, 1), &[("A", "(10|1)")]),
            (date(4, 2), &[("A", "(11|1.1)")]),
        ],
        BarePricePolicy::Unit,
    );
    let annotated = AnnotatedSeries::new(s);
    let periods = vec![
        Period::new("late", date(4, 3), date(4, 30)),
        Period::new("early", date(3, 1), date(3, 31)),
        Period::new("inside", date(4, 2), date(4, 2)),
    ];
    let results = calculate_periods(&annotated, &periods, ReturnMethod::TimeWeighted);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].period_name, "inside");
}

#[test]
fn test_standard_report_from_empty_history() {
    let annotated = AnnotatedSeries::new(Series::default());
    let periods = standard_periods(annotated.series());
    let report = assemble(calculate_periods(&annotated, &periods, ReturnMethod::TimeWeighted));
    assert!(report.is_empty());
}

#[test]
fn test_cell_encoding_round_trip() {
    for (value, price) in [(45957.6, 353.52), (0.0, 0.0), (-120.25, 1.0), (1e7, 0.01)] {
        let cell = parse_cell(&format!("({}|{})", value, price), BarePricePolicy::Unit);
        let back = parse_cell(&format_cell(&cell), BarePricePolicy::Unit);
        assert_eq!(back, cell);
    }
}

#[test]
fn test_history_file_round_trip_recomputes_totals() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("history.csv");
    std::fs::write(
        &path,
        "date,VOO,CASH,total_value\n2025-01-02,(1000|100),500,1\n2025-01-03,(1100|110),500,2\n",
    )?;

    let loaded = read_history(&path, BarePricePolicy::Unit)?;
    assert_eq!(loaded.get(0).unwrap().total_value, 1500.0);

    write_history(&path, &loaded)?;
    let reloaded = read_history(&path, BarePricePolicy::Unknown)?;
    assert_eq!(reloaded, loaded);

    let text = std::fs::read_to_string(&path)?;
    assert!(text.contains("2025-01-02,(500|1),(1000|100),1500.00"));
    Ok(())
}
