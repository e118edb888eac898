use crate::error::Result;
use crate::schema::GroupingMode;
use crate::utils::{current_year, validate_year};
use log::{info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const YEAR_FILTER: &str = "anoreferencia";
pub const COMPANY_FILTER: &str = "idempfiltro";
pub const COST_CENTER_FILTER: &str = "idcentroresultadofiltro";

pub const DEFAULT_PAGE_LIMIT: u32 = 1000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum LogicalOperator {
    #[serde(rename = "AND")]
    And,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum Operator {
    #[serde(rename = "IGUAL")]
    Equals,
}

/// One filter clause in the upstream query language.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Clause {
    #[serde(rename = "campo")]
    pub field: String,

    #[serde(rename = "operadorlogico")]
    pub logical_operator: LogicalOperator,

    #[serde(rename = "operador")]
    pub operator: Operator,

    #[serde(rename = "valor")]
    pub value: Value,
}

impl Clause {
    pub fn equals(field: &str, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            logical_operator: LogicalOperator::And,
            operator: Operator::Equals,
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct QueryPayload {
    pub page: u32,
    pub limit: u32,
    #[serde(rename = "clausulas")]
    pub clauses: Vec<Clause>,
}

impl QueryPayload {
    pub fn for_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}

/// Dashboard filters as the user picked them; ids arrive as free text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ResultsQuery {
    #[schemars(description = "Fiscal year to report on")]
    pub year: i32,

    #[schemars(description = "Company id; blank or non-numeric means every company")]
    #[serde(default)]
    pub company: Option<String>,

    #[schemars(description = "Cost-center id; blank, 'all' or non-numeric means every cost center")]
    #[serde(default)]
    pub cost_center: Option<String>,
}

impl ResultsQuery {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            company: None,
            cost_center: None,
        }
    }

    pub fn for_current_year() -> Self {
        Self::new(current_year())
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    pub fn with_cost_center(mut self, cost_center: impl Into<String>) -> Self {
        self.cost_center = Some(cost_center.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_year(self.year)
    }

    pub fn company_id(&self) -> Option<i64> {
        parse_id("company", self.company.as_deref())
    }

    pub fn cost_center_id(&self) -> Option<i64> {
        parse_id("cost center", self.cost_center.as_deref())
    }

    /// A single selected cost center is shown by account; otherwise accounts
    /// are grouped under every cost center.
    pub fn grouping_mode(&self) -> GroupingMode {
        match self.cost_center_id() {
            Some(_) => GroupingMode::ByAccount,
            None => GroupingMode::ByCostCenter,
        }
    }

    pub fn to_payload(&self, limit: u32) -> QueryPayload {
        let company = self.company_id();
        let cost_center = self.cost_center_id();

        let mut clauses = vec![Clause::equals(YEAR_FILTER, self.year)];

        if let Some(id) = company {
            clauses.push(Clause::equals(COMPANY_FILTER, id));
        }

        // The cost-center clause is always sent; null selects every center.
        let center_value = match cost_center {
            Some(id) => Value::from(id),
            None => Value::Null,
        };
        clauses.push(Clause::equals(COST_CENTER_FILTER, center_value));

        info!(
            "Results query: year={}, company={}, cost center={}",
            self.year,
            company.map_or_else(|| "all".to_string(), |id| id.to_string()),
            cost_center.map_or_else(|| "all".to_string(), |id| id.to_string()),
        );

        QueryPayload {
            page: 1,
            limit,
            clauses,
        }
    }
}

fn parse_id(label: &str, raw: Option<&str>) -> Option<i64> {
    let trimmed = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match trimmed.parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
            warn!("Ignoring invalid {} filter: {}", label, trimmed);
            None
        }
    }
}
