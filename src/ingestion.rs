//! Turns loosely typed upstream records into [`LineItem`]s.

use crate::error::RecordError;
use crate::schema::LineItem;
use serde_json::{Map, Value};

pub type RawRecord = Map<String, Value>;

pub const ACCOUNT_FIELD: &str = "contabil";
pub const MONTH_FIELD: &str = "mesNum";
pub const PRIOR_YEAR_FIELD: &str = "anoAnterior";
pub const PLANNED_FIELD: &str = "valorPrevisto";
pub const ACTUAL_FIELD: &str = "valorRealizado";

/// Label used when a record carries no cost center ("no center").
pub const NO_CENTER_LABEL: &str = "Sem Centro";

/// Field names the upstream API has used for the cost center, most specific first.
pub const COST_CENTER_FIELDS: [&str; 7] = [
    "centroresultados",
    "centroResultados",
    "centro_resultados",
    "centro",
    "centroResultado",
    "descrcentroresultado",
    "CENTRO_RESULTADOS",
];

pub type CenterExtractor = Box<dyn Fn(&RawRecord) -> Option<String> + Send + Sync>;

/// Ordered list of extractors; the first non-empty label wins.
pub struct CostCenterResolver {
    extractors: Vec<CenterExtractor>,
    fallback: String,
}

impl CostCenterResolver {
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            extractors: Vec::new(),
            fallback: fallback.into(),
        }
    }

    pub fn with_field(self, name: &'static str) -> Self {
        self.with_extractor(field_extractor(name))
    }

    pub fn with_extractor<F>(mut self, extractor: F) -> Self
    where
        F: Fn(&RawRecord) -> Option<String> + Send + Sync + 'static,
    {
        self.extractors.push(Box::new(extractor));
        self
    }

    pub fn resolve(&self, record: &RawRecord) -> String {
        self.extractors
            .iter()
            .find_map(|extract| extract(record))
            .unwrap_or_else(|| self.fallback.clone())
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl Default for CostCenterResolver {
    fn default() -> Self {
        COST_CENTER_FIELDS
            .iter()
            .fold(Self::new(NO_CENTER_LABEL), |resolver, field| {
                resolver.with_field(*field)
            })
    }
}

pub fn field_extractor(name: &'static str) -> impl Fn(&RawRecord) -> Option<String> + Send + Sync {
    move |record: &RawRecord| record.get(name).and_then(non_empty_label)
}

/// Strings must be non-empty; numbers must be non-zero. Everything else is "absent".
fn non_empty_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

pub fn account_code(record: &RawRecord) -> Result<String, RecordError> {
    record
        .get(ACCOUNT_FIELD)
        .and_then(non_empty_label)
        .ok_or(RecordError::MissingAccount)
}

/// Reads a month number from an integer, a float, a boolean, or an integer string.
///
/// Floats are truncated toward zero (`2.5` is February) and booleans count as
/// 1 and 0, matching how the upstream dashboard coerced months.
pub fn parse_month(value: Option<&Value>) -> Result<u32, RecordError> {
    let raw = match value {
        None | Some(Value::Null) => return Err(RecordError::MissingMonth),
        Some(Value::Bool(b)) => i64::from(*b),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(m) => m,
            None => match n.as_f64() {
                Some(f) if f.is_finite() && f.abs() < i64::MAX as f64 => f.trunc() as i64,
                _ => return Err(RecordError::UnparsableMonth(n.to_string())),
            },
        },
        Some(Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| RecordError::UnparsableMonth(s.clone()))?,
        Some(other) => return Err(RecordError::UnparsableMonth(other.to_string())),
    };

    if !(1..=12).contains(&raw) {
        return Err(RecordError::MonthOutOfRange(raw));
    }
    Ok(raw as u32)
}

/// Absent, null and empty-string amounts count as zero.
pub fn parse_amount(record: &RawRecord, field: &'static str) -> Result<f64, RecordError> {
    match record.get(field) {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| RecordError::InvalidAmount {
            field,
            value: n.to_string(),
        }),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| RecordError::InvalidAmount {
            field,
            value: s.clone(),
        }),
        Some(other) => Err(RecordError::InvalidAmount {
            field,
            value: other.to_string(),
        }),
    }
}

impl LineItem {
    /// Validates and normalizes one upstream record.
    ///
    /// Account is checked before month, then the amounts; the first problem
    /// found is returned and nothing about the record is kept.
    pub fn from_record(value: &Value, resolver: &CostCenterResolver) -> Result<Self, RecordError> {
        let record = value.as_object().ok_or(RecordError::NotAnObject)?;

        let account = account_code(record)?;
        let month = parse_month(record.get(MONTH_FIELD))?;
        let cost_center = resolver.resolve(record);

        Ok(LineItem {
            account,
            month,
            cost_center,
            prior_year: parse_amount(record, PRIOR_YEAR_FIELD)?,
            planned: parse_amount(record, PLANNED_FIELD)?,
            actual: parse_amount(record, ACTUAL_FIELD)?,
        })
    }
}
