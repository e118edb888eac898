//! Flat exports and display helpers for the aggregated grids.

use crate::error::{DashboardError, Result};
use crate::schema::{AggregationResult, GroupedResults, MonthValues, ValueField};
use crate::totals::TotalsTable;
use crate::utils::month_keys;
use csv::Writer;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// How an actual amount compares with its plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarianceStatus {
    /// Nothing realized yet, or exactly on plan.
    Neutral,
    OverBudget,
    UnderBudget,
}

impl VarianceStatus {
    pub fn classify(actual: f64, planned: f64) -> Self {
        if actual <= 0.0 || actual == planned {
            Self::Neutral
        } else if actual > planned {
            Self::OverBudget
        } else {
            Self::UnderBudget
        }
    }

    pub fn of(values: &MonthValues) -> Self {
        Self::classify(values.actual, values.planned)
    }
}

/// Column span of a month-by-field table: three value columns per month plus the label column.
pub fn table_colspan(months: usize) -> usize {
    months * ValueField::ALL.len() + 1
}

fn variance_label(status: VarianceStatus) -> &'static str {
    match status {
        VarianceStatus::Neutral => "",
        VarianceStatus::OverBudget => "over",
        VarianceStatus::UnderBudget => "under",
    }
}

fn amount(value: f64) -> String {
    format!("{:.2}", value)
}

fn write_cell<W: Write>(
    wtr: &mut Writer<W>,
    first: &str,
    second: &str,
    month: &str,
    values: &MonthValues,
) -> Result<()> {
    wtr.write_record([
        first.to_string(),
        second.to_string(),
        month.to_string(),
        amount(values.prior_year),
        amount(values.planned),
        amount(values.actual),
        variance_label(VarianceStatus::of(values)).to_string(),
    ])?;
    Ok(())
}

fn finish(wtr: Writer<Vec<u8>>) -> Result<String> {
    let data = wtr
        .into_inner()
        .map_err(|e| DashboardError::Export(format!("CSV writer error: {}", e)))?;
    String::from_utf8(data)
        .map_err(|e| DashboardError::Export(format!("UTF-8 conversion error: {}", e)))
}

/// One line per populated month cell, in account/month order.
///
/// Labels containing separators or quotes are quoted.
pub fn to_csv(result: &AggregationResult) -> Result<String> {
    let mut wtr = Writer::from_writer(vec![]);

    match &result.grouping {
        GroupedResults::ByAccount { by_account, .. } => {
            wtr.write_record([
                "Account",
                "Cost Center",
                "Month",
                "Prior Year",
                "Planned",
                "Actual",
                "Variance",
            ])?;
            for (account, months) in by_account {
                for (month, cell) in months {
                    write_cell(&mut wtr, account, &cell.cost_center, month, &cell.values)?;
                }
            }
        }
        GroupedResults::ByCostCenter { by_cost_center } => {
            wtr.write_record([
                "Cost Center",
                "Account",
                "Month",
                "Prior Year",
                "Planned",
                "Actual",
                "Variance",
            ])?;
            for (center, accounts) in by_cost_center {
                for (account, months) in accounts {
                    for (month, values) in months {
                        write_cell(&mut wtr, center, account, month, values)?;
                    }
                }
            }
        }
    }

    finish(wtr)
}

/// One line per (group, field) with the twelve month sums and the year total.
///
/// Months without data are left blank rather than written as zero.
pub fn totals_csv(totals: &TotalsTable) -> Result<String> {
    let months = month_keys();
    let mut wtr = Writer::from_writer(vec![]);

    let mut header = vec!["Group".to_string(), "Field".to_string()];
    header.extend(months.iter().cloned());
    header.push("Total".to_string());
    wtr.write_record(&header)?;

    for group in totals.groups() {
        for field in ValueField::ALL {
            let mut row = vec![group.to_string(), field.key().to_string()];
            for month in &months {
                row.push(totals.month_total(group, month, field).map(amount).unwrap_or_default());
            }
            row.push(amount(totals.year_total(group, field).unwrap_or(0.0)));
            wtr.write_record(&row)?;
        }
    }

    finish(wtr)
}
