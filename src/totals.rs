use crate::schema::{MonthValues, ValueField};
use crate::utils::month_keys;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Running sums grouped by a label (cost center or account).
///
/// Reads never create entries: a missing group or key is reported as `None`,
/// not as zero. Only [`TotalsTable::accumulate`] inserts, starting a fresh key
/// at `0.0` before adding to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct TotalsTable(BTreeMap<String, BTreeMap<String, f64>>);

impl TotalsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, group: &str, key: &str, amount: f64) {
        if !self.0.contains_key(group) {
            self.0.insert(group.to_string(), BTreeMap::new());
        }
        if let Some(row) = self.0.get_mut(group) {
            let slot = row.entry(key.to_string()).or_insert(0.0);
            *slot += amount;
        }
    }

    /// Adds one record's amounts to both the month keys and the yearly keys.
    pub fn accumulate_month(&mut self, group: &str, month: &str, values: &MonthValues) {
        for field in ValueField::ALL {
            let amount = values.get(field);
            self.accumulate(group, &field.month_key(month), amount);
            self.accumulate(group, &field.total_key(), amount);
        }
    }

    /// Adds one record's amounts to the yearly keys only.
    pub fn accumulate_year(&mut self, group: &str, values: &MonthValues) {
        for field in ValueField::ALL {
            self.accumulate(group, &field.total_key(), values.get(field));
        }
    }

    pub fn get(&self, group: &str, key: &str) -> Option<f64> {
        self.0.get(group).and_then(|row| row.get(key)).copied()
    }

    pub fn year_total(&self, group: &str, field: ValueField) -> Option<f64> {
        self.get(group, &field.total_key())
    }

    pub fn month_total(&self, group: &str, month: &str, field: ValueField) -> Option<f64> {
        self.get(group, &field.month_key(month))
    }

    /// Sum of the twelve month keys of `field`; absent months count as zero.
    pub fn sum_of_months(&self, group: &str, field: ValueField) -> f64 {
        month_keys()
            .iter()
            .filter_map(|month| self.month_total(group, month, field))
            .sum()
    }

    pub fn row(&self, group: &str) -> Option<&BTreeMap<String, f64>> {
        self.0.get(group)
    }

    pub fn groups(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn contains_group(&self, group: &str) -> bool {
        self.0.contains_key(group)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, BTreeMap<String, f64>> {
        self.0
    }
}
