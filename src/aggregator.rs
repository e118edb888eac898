use crate::error::RecordError;
use crate::ingestion::CostCenterResolver;
use crate::schema::*;
use crate::totals::TotalsTable;
use crate::utils::month_key;
use log::{debug, info, warn};
use serde_json::Value;

/// Per-record debug output is limited to the first few records of a batch.
const DEBUG_SAMPLE_SIZE: usize = 3;

pub struct Aggregator {
    mode: GroupingMode,
    resolver: CostCenterResolver,
}

// Working state for a single aggregation call
struct Accumulator {
    mode: GroupingMode,
    by_account: AggregatedByAccount,
    by_cost_center: AggregatedByCostCenter,
    center_totals: TotalsTable,
    account_totals: TotalsTable,
    skipped: Vec<SkippedRecord>,
}

impl Accumulator {
    fn new(mode: GroupingMode) -> Self {
        Self {
            mode,
            by_account: AggregatedByAccount::new(),
            by_cost_center: AggregatedByCostCenter::new(),
            center_totals: TotalsTable::new(),
            account_totals: TotalsTable::new(),
            skipped: Vec::new(),
        }
    }

    fn skip(&mut self, index: usize, error: RecordError) {
        warn!("Skipping record #{}: {}", index, error);
        self.skipped.push(SkippedRecord { index, error });
    }

    fn add(&mut self, item: &LineItem) {
        let month = month_key(item.month);
        let values = item.values();

        // Colliding buckets are replaced, not merged; the totals below still see every record.
        match self.mode {
            GroupingMode::ByCostCenter => {
                let accounts = self
                    .by_cost_center
                    .entry(item.cost_center.clone())
                    .or_default();
                let months = accounts.entry(item.account.clone()).or_default();
                months.insert(month.clone(), values);
            }
            GroupingMode::ByAccount => {
                let months = self.by_account.entry(item.account.clone()).or_default();
                months.insert(
                    month.clone(),
                    AccountMonthCell {
                        values,
                        cost_center: item.cost_center.clone(),
                    },
                );
            }
        }

        self.center_totals
            .accumulate_month(&item.cost_center, &month, &values);

        if self.mode == GroupingMode::ByAccount {
            self.account_totals.accumulate_year(&item.account, &values);
        }
    }

    fn finish(self) -> AggregationResult {
        let grouping = match self.mode {
            GroupingMode::ByAccount => {
                info!("Aggregated {} accounts", self.by_account.len());
                GroupedResults::ByAccount {
                    by_account: self.by_account,
                    account_totals: self.account_totals,
                }
            }
            GroupingMode::ByCostCenter => {
                info!("Aggregated {} cost centers", self.by_cost_center.len());
                GroupedResults::ByCostCenter {
                    by_cost_center: self.by_cost_center,
                }
            }
        };

        if !self.skipped.is_empty() {
            info!("{} records were skipped", self.skipped.len());
        }

        AggregationResult {
            grouping,
            center_totals: self.center_totals,
            skipped: self.skipped,
        }
    }
}

impl Aggregator {
    pub fn new(mode: GroupingMode) -> Self {
        Self {
            mode,
            resolver: CostCenterResolver::default(),
        }
    }

    pub fn with_resolver(mut self, resolver: CostCenterResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn mode(&self) -> GroupingMode {
        self.mode
    }

    /// Aggregates raw upstream records in input order.
    ///
    /// Records that fail validation are left out and reported in
    /// [`AggregationResult::skipped`]; the rest of the batch is unaffected.
    pub fn aggregate(&self, records: &[Value]) -> AggregationResult {
        debug!(
            "Aggregating {} records in {:?} mode",
            records.len(),
            self.mode
        );

        let mut acc = Accumulator::new(self.mode);

        for (index, raw) in records.iter().enumerate() {
            match LineItem::from_record(raw, &self.resolver) {
                Ok(item) => {
                    if index < DEBUG_SAMPLE_SIZE {
                        debug!(
                            "Record #{} - account: {}, center: {}, month: {}",
                            index, item.account, item.cost_center, item.month
                        );
                    }
                    acc.add(&item);
                }
                Err(error) => acc.skip(index, error),
            }
        }

        acc.finish()
    }

    /// Aggregates already-typed line items.
    ///
    /// Items with an empty account or a month outside 1..=12 are skipped the
    /// same way malformed raw records are. An empty cost center is filed under
    /// the resolver's fallback label.
    pub fn aggregate_items(&self, items: &[LineItem]) -> AggregationResult {
        let mut acc = Accumulator::new(self.mode);

        for (index, item) in items.iter().enumerate() {
            if item.account.is_empty() {
                acc.skip(index, RecordError::MissingAccount);
            } else if !(1..=12).contains(&item.month) {
                acc.skip(index, RecordError::MonthOutOfRange(i64::from(item.month)));
            } else if item.cost_center.trim().is_empty() {
                let labelled = LineItem {
                    cost_center: self.resolver.fallback().to_string(),
                    ..item.clone()
                };
                acc.add(&labelled);
            } else {
                acc.add(item);
            }
        }

        acc.finish()
    }
}

pub fn aggregate(records: &[Value], group_by_cost_center: bool) -> AggregationResult {
    Aggregator::new(GroupingMode::from_flag(group_by_cost_center)).aggregate(records)
}
