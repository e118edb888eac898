use cost_center_results::*;
use futures::executor::block_on;
use serde_json::{json, Value};

fn record(account: &str, month: Value, center: &str, prior: f64, planned: f64, actual: f64) -> Value {
    json!({
        "contabil": account,
        "mesNum": month,
        "centroresultados": center,
        "anoAnterior": prior,
        "valorPrevisto": planned,
        "valorRealizado": actual,
    })
}

/// A year of data for two cost centers and three accounts, with a few
/// records the upstream is known to send malformed.
fn fiscal_year_records() -> Vec<Value> {
    let mut records = Vec::new();

    for month in 1..=12 {
        let m = month as f64;
        records.push(record("3.1.01", json!(month), "Sales", 900.0 + m, 1000.0, 950.0 + m));
        records.push(record("4.2.10", json!(format!("{:02}", month)), "Sales", 200.0, 250.0, 240.0));
        records.push(record("4.2.10", json!(month), "Admin", 300.0, 320.0, 330.0 + m));
    }

    records.push(record("4.9.99", Value::Null, "Admin", 1.0, 1.0, 1.0));
    records.push(json!({"mesNum": 5, "valorPrevisto": 77, "centro": "Admin"}));
    records.push(record("4.9.99", json!("maio"), "Admin", 1.0, 1.0, 1.0));

    records
}

#[test]
fn test_full_year_by_cost_center() {
    let records = fiscal_year_records();
    let result = aggregate(&records, true);

    assert_eq!(result.skipped.len(), 3);

    let grid = result.by_cost_center().unwrap();
    assert_eq!(grid.len(), 2);
    assert_eq!(grid["Sales"].len(), 2);
    assert_eq!(grid["Admin"].len(), 1);
    assert_eq!(grid["Sales"]["3.1.01"].len(), 12);
    assert!(grid["Sales"]["3.1.01"].keys().all(|k| k.len() == 2));

    let planned_sales = result
        .center_totals
        .year_total("Sales", ValueField::Planned)
        .unwrap();
    assert!((planned_sales - 12.0 * 1250.0).abs() < 1e-9);

    assert!(!result.center_totals.contains_group("4.9.99"));
    assert!(grid.values().all(|accounts| !accounts.contains_key("4.9.99")));
}

#[test]
fn test_full_year_by_account() {
    let records = fiscal_year_records();
    let result = aggregate(&records, false);

    let grid = result.by_account().unwrap();
    assert_eq!(grid.len(), 2);
    assert!(!grid.contains_key("4.9.99"));

    // 4.2.10 is booked in two centers for the same months: the later record owns the cell.
    let july = &grid["4.2.10"]["07"];
    assert_eq!(july.cost_center, "Admin");
    assert_eq!(july.values.actual, 337.0);

    // ...while the account totals include both centers.
    let totals = result.account_totals().unwrap();
    let planned = totals.year_total("4.2.10", ValueField::Planned).unwrap();
    assert!((planned - 12.0 * (250.0 + 320.0)).abs() < 1e-9);

    // Center totals are still keyed by cost center in this mode.
    assert!(result.center_totals.contains_group("Sales"));
    assert!(result.center_totals.contains_group("Admin"));
    assert!(!result.center_totals.contains_group("3.1.01"));
}

#[test]
fn test_year_total_equals_sum_of_months() {
    let records = fiscal_year_records();

    for group_by_center in [true, false] {
        let result = aggregate(&records, group_by_center);
        for center in result.center_totals.groups() {
            for field in ValueField::ALL {
                let year = result.center_totals.year_total(center, field).unwrap();
                let months = result.center_totals.sum_of_months(center, field);
                assert!(
                    (year - months).abs() < 1e-9,
                    "{} {:?}: year {} != months {}",
                    center,
                    field,
                    year,
                    months
                );
            }
        }
    }
}

#[test]
fn test_reaggregation_is_idempotent() {
    let records = fiscal_year_records();

    let aggregator = Aggregator::new(GroupingMode::ByAccount);
    let first = aggregator.aggregate(&records);
    let second = aggregator.aggregate(&records);
    assert_eq!(first, second);

    assert_eq!(aggregate(&records, true), aggregate(&records, true));
}

#[test]
fn test_month_forms_share_a_key() {
    let as_number = aggregate(&[record("1", json!(7), "A", 0.0, 1.0, 0.0)], false);
    let as_string = aggregate(&[record("1", json!("07"), "A", 0.0, 1.0, 0.0)], false);

    assert_eq!(as_number, as_string);
    assert!(as_number.by_account().unwrap()["1"].contains_key("07"));
}

#[test]
fn test_documented_scenario() {
    let records = vec![
        json!({"contabil": "101", "mesNum": 1, "valorPrevisto": 100, "valorRealizado": 90, "centro": "A"}),
        json!({"contabil": "101", "mesNum": 1, "valorPrevisto": 50, "valorRealizado": 60, "centro": "A"}),
    ];

    let result = aggregate(&records, false);
    let cell = &result.by_account().unwrap()["101"]["01"];

    assert_eq!(cell.values.planned, 50.0);
    assert_eq!(cell.values.actual, 60.0);
    assert_eq!(cell.cost_center, "A");

    let account_totals = result.account_totals().unwrap();
    assert_eq!(account_totals.get("101", "planned_total"), Some(150.0));
    assert_eq!(account_totals.get("101", "actual_total"), Some(150.0));
    assert_eq!(result.center_totals.get("A", "planned_total"), Some(150.0));
}

#[test]
fn test_null_month_contributes_nothing() {
    let records = vec![json!({"contabil": "101", "mesNum": null, "valorPrevisto": 100, "centro": "A"})];

    for group_by_center in [true, false] {
        let result = aggregate(&records, group_by_center);
        assert!(result.is_empty());
        assert!(result.account_totals().map_or(true, |t| t.is_empty()));
        assert_eq!(result.skipped[0].error, RecordError::MissingMonth);
    }
}

#[test]
fn test_output_serializes_for_renderer() {
    let records = fiscal_year_records();
    let json: Value = serde_json::from_str(&aggregate(&records, false).to_json().unwrap()).unwrap();

    assert_eq!(json["mode"], "by_account");
    assert_eq!(json["by_account"]["3.1.01"]["01"]["planned"], 1000.0);
    assert_eq!(json["by_account"]["3.1.01"]["01"]["cost_center"], "Sales");
    assert_eq!(json["account_totals"]["4.2.10"]["planned_total"], 6840.0);
    assert_eq!(json["center_totals"]["Admin"]["01_planned"], 320.0);
    assert!(json.get("skipped").is_none());

    let round_trip: AggregationResult = serde_json::from_value(json).unwrap();
    assert_eq!(round_trip.mode(), GroupingMode::ByAccount);
}

#[test]
fn test_paginated_fetch_into_dashboard() -> anyhow::Result<()> {
    let records = fiscal_year_records();
    let chunks: Vec<Vec<Value>> = records.chunks(10).map(|c| c.to_vec()).collect();
    let total = records.len() as u64;
    let last = chunks.len() as u32;

    let query = ResultsQuery::new(2025).with_company("1");
    let payload = query.to_payload(10);
    let mut requested = Vec::new();

    let collection = block_on(collect_pages(
        |page| {
            requested.push(payload.for_page(page).page);
            let data = chunks[(page - 1) as usize].clone();
            async move {
                Ok::<Page, DashboardError>(Page {
                    data,
                    total,
                    has_next: page < last,
                })
            }
        },
        100,
    ));

    assert_eq!(requested, (1..=last).collect::<Vec<_>>());
    assert!(collection.complete);
    assert_eq!(collection.records.len(), records.len());

    let dashboard = build_dashboard(&query, &collection)?;
    assert_eq!(dashboard.mode(), GroupingMode::ByCostCenter);
    assert_eq!(dashboard.skipped_count(), 3);
    assert_eq!(dashboard.result, aggregate(&records, true));

    Ok(())
}

#[test]
fn test_csv_exports() -> anyhow::Result<()> {
    let result = aggregate(&fiscal_year_records(), true);

    let grid_csv = report::to_csv(&result)?;
    assert_eq!(grid_csv.lines().count(), 1 + 36);

    let totals_csv = report::totals_csv(&result.center_totals)?;
    assert_eq!(totals_csv.lines().count(), 1 + 2 * 3);
    assert!(totals_csv.contains("Sales,planned,1250.00"));

    Ok(())
}

#[test]
fn test_csv_keeps_columns_for_described_centers() -> anyhow::Result<()> {
    let records = vec![
        json!({"contabil": "101", "mesNum": 1, "valorPrevisto": 10, "valorRealizado": 5, "descrcentroresultado": "Vendas, Norte"}),
        json!({"contabil": "102", "mesNum": 2, "valorPrevisto": 4, "descrcentroresultado": "Loja \"Centro\""}),
    ];

    for group_by_center in [true, false] {
        let result = aggregate(&records, group_by_center);
        for export in [report::to_csv(&result)?, report::totals_csv(&result.center_totals)?] {
            let mut reader = csv::Reader::from_reader(export.as_bytes());
            let width = reader.headers()?.len();
            for row in reader.records() {
                assert_eq!(row?.len(), width);
            }
        }
    }

    let grid_csv = report::to_csv(&aggregate(&records, false))?;
    assert!(grid_csv.contains("101,\"Vendas, Norte\",01"));
    assert!(grid_csv.contains("102,\"Loja \"\"Centro\"\"\",02"));

    Ok(())
}
