use crate::error::RecordError;
use crate::totals::TotalsTable;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    #[schemars(
        description = "One row per account with its monthly cells. Used when a single cost center was selected."
    )]
    ByAccount,

    #[schemars(
        description = "Accounts nested under each cost center. Used when every cost center is shown."
    )]
    ByCostCenter,
}

impl GroupingMode {
    pub fn from_flag(group_by_cost_center: bool) -> Self {
        if group_by_cost_center {
            Self::ByCostCenter
        } else {
            Self::ByAccount
        }
    }

    pub fn groups_by_cost_center(self) -> bool {
        matches!(self, Self::ByCostCenter)
    }
}

/// The three amounts carried by every line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueField {
    PriorYear,
    Planned,
    Actual,
}

impl ValueField {
    pub const ALL: [ValueField; 3] = [ValueField::PriorYear, ValueField::Planned, ValueField::Actual];

    pub fn key(self) -> &'static str {
        match self {
            Self::PriorYear => "prior_year",
            Self::Planned => "planned",
            Self::Actual => "actual",
        }
    }

    /// Totals key for one month, e.g. `"03_planned"`.
    pub fn month_key(self, month: &str) -> String {
        format!("{}_{}", month, self.key())
    }

    /// Totals key for the whole year, e.g. `"planned_total"`.
    pub fn total_key(self) -> String {
        format!("{}_total", self.key())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct LineItem {
    #[schemars(description = "Ledger account code (e.g. '3.1.01')")]
    pub account: String,

    #[schemars(description = "Calendar month, 1 = January through 12 = December")]
    pub month: u32,

    #[schemars(description = "Cost-center label the record was booked against")]
    pub cost_center: String,

    #[serde(default)]
    pub prior_year: f64,

    #[serde(default)]
    pub planned: f64,

    #[serde(default)]
    pub actual: f64,
}

impl LineItem {
    pub fn values(&self) -> MonthValues {
        MonthValues {
            prior_year: self.prior_year,
            planned: self.planned,
            actual: self.actual,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct MonthValues {
    pub prior_year: f64,
    pub planned: f64,
    pub actual: f64,
}

impl MonthValues {
    pub fn get(&self, field: ValueField) -> f64 {
        match field {
            ValueField::PriorYear => self.prior_year,
            ValueField::Planned => self.planned,
            ValueField::Actual => self.actual,
        }
    }
}

/// A month cell of the by-account grid; keeps the cost center for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct AccountMonthCell {
    #[serde(flatten)]
    pub values: MonthValues,
    pub cost_center: String,
}

/// Month key ("01".."12") to cell.
pub type MonthGrid<T> = BTreeMap<String, T>;

/// account -> month -> cell
pub type AggregatedByAccount = BTreeMap<String, MonthGrid<AccountMonthCell>>;

/// cost center -> account -> month -> values
pub type AggregatedByCostCenter = BTreeMap<String, BTreeMap<String, MonthGrid<MonthValues>>>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum GroupedResults {
    ByAccount {
        by_account: AggregatedByAccount,
        #[schemars(description = "Per-account yearly totals keyed '{field}_total'")]
        account_totals: TotalsTable,
    },
    ByCostCenter {
        by_cost_center: AggregatedByCostCenter,
    },
}

/// A record the aggregator left out, with its position in the input.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub index: usize,
    pub error: RecordError,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct AggregationResult {
    #[serde(flatten)]
    pub grouping: GroupedResults,

    #[schemars(
        description = "Per-cost-center running sums keyed '{month}_{field}' and '{field}_total'"
    )]
    pub center_totals: TotalsTable,

    #[serde(skip)]
    pub skipped: Vec<SkippedRecord>,
}

impl AggregationResult {
    pub fn mode(&self) -> GroupingMode {
        match self.grouping {
            GroupedResults::ByAccount { .. } => GroupingMode::ByAccount,
            GroupedResults::ByCostCenter { .. } => GroupingMode::ByCostCenter,
        }
    }

    pub fn by_account(&self) -> Option<&AggregatedByAccount> {
        match &self.grouping {
            GroupedResults::ByAccount { by_account, .. } => Some(by_account),
            GroupedResults::ByCostCenter { .. } => None,
        }
    }

    pub fn by_cost_center(&self) -> Option<&AggregatedByCostCenter> {
        match &self.grouping {
            GroupedResults::ByCostCenter { by_cost_center } => Some(by_cost_center),
            GroupedResults::ByAccount { .. } => None,
        }
    }

    pub fn account_totals(&self) -> Option<&TotalsTable> {
        match &self.grouping {
            GroupedResults::ByAccount { account_totals, .. } => Some(account_totals),
            GroupedResults::ByCostCenter { .. } => None,
        }
    }

    /// True when no record made it into the grid.
    pub fn is_empty(&self) -> bool {
        let grid_empty = match &self.grouping {
            GroupedResults::ByAccount { by_account, .. } => by_account.is_empty(),
            GroupedResults::ByCostCenter { by_cost_center } => by_cost_center.is_empty(),
        };
        grid_empty && self.center_totals.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AggregationResult)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_field_keys() {
        assert_eq!(ValueField::Planned.month_key("03"), "03_planned");
        assert_eq!(ValueField::PriorYear.total_key(), "prior_year_total");
        assert_eq!(ValueField::Actual.total_key(), "actual_total");
    }

    #[test]
    fn test_grouping_mode_from_flag() {
        assert_eq!(GroupingMode::from_flag(true), GroupingMode::ByCostCenter);
        assert_eq!(GroupingMode::from_flag(false), GroupingMode::ByAccount);
        assert!(GroupingMode::ByCostCenter.groups_by_cost_center());
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = AggregationResult::schema_as_json().unwrap();
        assert!(schema_json.contains("center_totals"));
        assert!(schema_json.contains("by_account"));
        assert!(schema_json.contains("by_cost_center"));
    }

    #[test]
    fn test_account_cell_serializes_flat() {
        let cell = AccountMonthCell {
            values: MonthValues {
                prior_year: 1.0,
                planned: 2.0,
                actual: 3.0,
            },
            cost_center: "Admin".to_string(),
        };

        let json = serde_json::to_value(&cell).unwrap();
        assert_eq!(json["planned"], 2.0);
        assert_eq!(json["cost_center"], "Admin");
    }
}
