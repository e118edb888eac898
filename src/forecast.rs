use crate::error::Result;
use crate::utils::validate_month;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Forecast kind sent along with deletions; the upstream ignores it but requires a value.
pub const DELETE_KIND: &str = "V";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub enum AdjustmentAction {
    #[serde(rename = "I")]
    #[schemars(description = "Insert the adjustment, or update it if one exists for the same key")]
    Upsert,

    #[serde(rename = "D")]
    #[schemars(description = "Remove the adjustment")]
    Delete,
}

/// A planned-value override for one (company, account, cost center, month).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct ForecastAdjustment {
    #[serde(rename = "IN_IDEEMPPREVISAO")]
    pub company_id: i64,

    #[serde(rename = "IN_IDCTACONTABIL")]
    pub account_id: i64,

    #[serde(rename = "IN_TIPOPREVISAO")]
    #[schemars(description = "Forecast kind code as defined by the upstream (e.g. 'V' for value)")]
    pub kind: String,

    #[serde(rename = "IN_VALORPREVISAO")]
    pub value: f64,

    #[serde(rename = "IN_IDCENTRORESULTADO")]
    pub cost_center_id: i64,

    #[serde(rename = "IN_MESPREVISAO")]
    #[schemars(description = "Month 1-12; null applies the adjustment to the whole year")]
    pub month: Option<u32>,

    #[serde(rename = "IN_ACAO")]
    pub action: AdjustmentAction,
}

impl ForecastAdjustment {
    pub fn upsert(
        company_id: i64,
        account_id: i64,
        cost_center_id: i64,
        kind: impl Into<String>,
        value: f64,
        month: Option<u32>,
    ) -> Result<Self> {
        if let Some(m) = month {
            validate_month(m)?;
        }
        Ok(Self {
            company_id,
            account_id,
            kind: kind.into(),
            value,
            cost_center_id,
            month,
            action: AdjustmentAction::Upsert,
        })
    }

    pub fn delete(
        company_id: i64,
        account_id: i64,
        cost_center_id: i64,
        month: Option<u32>,
    ) -> Result<Self> {
        if let Some(m) = month {
            validate_month(m)?;
        }
        Ok(Self {
            company_id,
            account_id,
            kind: DELETE_KIND.to_string(),
            value: 0.0,
            cost_center_id,
            month,
            action: AdjustmentAction::Delete,
        })
    }
}
