use cost_center_results::{aggregate, report, GroupingMode};
use serde_json::Value;
use std::error::Error;
use std::fs;

// Usage: aggregate_file <records.json> [--by-center]
fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or("usage: aggregate_file <records.json> [--by-center]")?;
    let group_by_center = args.any(|a| a == "--by-center");

    let raw = fs::read_to_string(&path)?;
    let parsed: Value = serde_json::from_str(&raw)?;

    // Accept either a bare array or the API's page envelope.
    let records = match parsed {
        Value::Array(items) => items,
        Value::Object(mut envelope) => match envelope.remove("data") {
            Some(Value::Array(items)) => items,
            _ => return Err("expected an array or an object with a 'data' array".into()),
        },
        _ => return Err("expected an array or an object with a 'data' array".into()),
    };

    let result = aggregate(&records, group_by_center);

    println!(
        "Aggregated {} records ({} skipped) in {:?} mode\n",
        records.len(),
        result.skipped.len(),
        GroupingMode::from_flag(group_by_center)
    );
    for skipped in &result.skipped {
        println!("  skipped #{}: {}", skipped.index, skipped.error);
    }

    println!("\n{}", report::to_csv(&result)?);
    println!("{}", report::totals_csv(&result.center_totals)?);

    Ok(())
}
