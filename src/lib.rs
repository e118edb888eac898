//! # Cost-Center Results
//!
//! Aggregates budget/actuals line items, as returned page by page by the
//! results API, into monthly grids with running totals.
//!
//! ## Core Concepts
//!
//! - **Line item**: one (account, month, cost center) record carrying prior-year,
//!   planned and actual amounts
//! - **By account**: one row per account with its monthly cells; used when a
//!   single cost center is selected
//! - **By cost center**: accounts nested under every cost center
//! - **Center totals**: per-month and per-year running sums per cost center,
//!   produced in both modes
//! - **Account totals**: per-year running sums per account (by-account mode only)
//!
//! Malformed records never abort a batch: they are skipped and listed in
//! [`AggregationResult::skipped`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use cost_center_results::*;
//! use serde_json::json;
//!
//! let records = vec![
//!     json!({"contabil": "101", "mesNum": 1, "valorPrevisto": 100, "valorRealizado": 90, "centro": "A"}),
//!     json!({"contabil": "101", "mesNum": 1, "valorPrevisto": 50, "valorRealizado": 60, "centro": "A"}),
//! ];
//!
//! let result = aggregate(&records, false);
//! assert_eq!(result.account_totals().unwrap().get("101", "planned_total"), Some(150.0));
//! ```

pub mod aggregator;
pub mod config;
pub mod error;
pub mod forecast;
pub mod ingestion;
pub mod pagination;
pub mod query;
pub mod report;
pub mod schema;
pub mod totals;
pub mod utils;

#[cfg(feature = "api")]
pub mod client;

pub use aggregator::{aggregate, Aggregator};
pub use config::ApiSettings;
pub use error::{DashboardError, RecordError, Result};
pub use forecast::{AdjustmentAction, ForecastAdjustment};
pub use ingestion::{CostCenterResolver, NO_CENTER_LABEL};
pub use pagination::{collect_pages, Page, PageCollection};
pub use query::{Clause, QueryPayload, ResultsQuery};
pub use report::{table_colspan, VarianceStatus};
pub use schema::*;
pub use totals::TotalsTable;
pub use utils::*;

#[cfg(feature = "api")]
pub use client::{Catalog, ResultsClient};

use log::{debug, info, warn};
use serde::Serialize;

/// Everything the results page needs for one query.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub query: ResultsQuery,
    pub records_fetched: usize,
    /// False when not every page could be fetched.
    pub complete: bool,
    pub result: AggregationResult,
}

impl Dashboard {
    pub fn mode(&self) -> GroupingMode {
        self.result.mode()
    }

    pub fn skipped_count(&self) -> usize {
        self.result.skipped.len()
    }
}

pub struct DashboardProcessor;

impl DashboardProcessor {
    /// Aggregates collected pages in the mode the query's filters imply.
    pub fn process(query: &ResultsQuery, pages: &PageCollection) -> Result<Dashboard> {
        query.validate()?;

        let mode = query.grouping_mode();
        info!(
            "Building dashboard for {} from {} records ({:?})",
            query.year,
            pages.records.len(),
            mode
        );

        if !pages.complete {
            warn!(
                "Dashboard for {} built from partial data: {} of {} records",
                query.year,
                pages.records.len(),
                pages.reported_total
            );
        }

        let result = Aggregator::new(mode).aggregate(&pages.records);

        for skipped in &result.skipped {
            debug!("Record #{} left out: {}", skipped.index, skipped.error);
        }

        Ok(Dashboard {
            query: query.clone(),
            records_fetched: pages.records.len(),
            complete: pages.complete,
            result,
        })
    }
}

pub fn build_dashboard(query: &ResultsQuery, pages: &PageCollection) -> Result<Dashboard> {
    DashboardProcessor::process(query, pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pages(records: Vec<serde_json::Value>, complete: bool) -> PageCollection {
        PageCollection {
            reported_total: records.len() as u64,
            records,
            pages_fetched: 1,
            complete,
        }
    }

    #[test]
    fn test_all_centers_groups_by_cost_center() {
        let query = ResultsQuery::new(2025);
        let collected = pages(
            vec![
                json!({"contabil": "101", "mesNum": 1, "valorPrevisto": 10, "centro": "A"}),
                json!({"contabil": "101", "mesNum": 1, "valorPrevisto": 20, "centro": "B"}),
            ],
            true,
        );

        let dashboard = build_dashboard(&query, &collected).unwrap();

        assert_eq!(dashboard.mode(), GroupingMode::ByCostCenter);
        assert_eq!(dashboard.records_fetched, 2);
        let grid = dashboard.result.by_cost_center().unwrap();
        assert_eq!(grid["A"]["101"]["01"].planned, 10.0);
        assert_eq!(grid["B"]["101"]["01"].planned, 20.0);
    }

    #[test]
    fn test_single_center_groups_by_account() {
        let query = ResultsQuery::new(2025).with_cost_center("4");
        let collected = pages(
            vec![json!({"contabil": "101", "mesNum": 6, "valorRealizado": 5, "centro": "A"})],
            false,
        );

        let dashboard = build_dashboard(&query, &collected).unwrap();

        assert_eq!(dashboard.mode(), GroupingMode::ByAccount);
        assert!(!dashboard.complete);
        assert_eq!(
            dashboard.result.account_totals().unwrap().get("101", "actual_total"),
            Some(5.0)
        );
    }

    #[test]
    fn test_invalid_year_rejected() {
        let query = ResultsQuery::new(0);
        assert!(build_dashboard(&query, &PageCollection::default()).is_err());
    }

    #[test]
    fn test_skipped_count() {
        let query = ResultsQuery::new(2025);
        let collected = pages(vec![json!({"contabil": "1"}), json!({"mesNum": 1})], true);

        let dashboard = build_dashboard(&query, &collected).unwrap();
        assert_eq!(dashboard.skipped_count(), 2);
        assert!(dashboard.result.is_empty());
    }
}
