use crate::error::{DashboardError, Result};
use chrono::{Datelike, Local};

pub const MONTHS_IN_YEAR: u32 = 12;

/// Two-character month key used throughout the grids ("01".."12").
pub fn month_key(month: u32) -> String {
    format!("{:02}", month)
}

pub fn month_keys() -> Vec<String> {
    (1..=MONTHS_IN_YEAR).map(month_key).collect()
}

pub fn validate_month(month: u32) -> Result<()> {
    if !(1..=MONTHS_IN_YEAR).contains(&month) {
        return Err(DashboardError::InvalidMonth(month));
    }
    Ok(())
}

pub fn validate_year(year: i32) -> Result<()> {
    if !(1900..=9999).contains(&year) {
        return Err(DashboardError::InvalidYear(year));
    }
    Ok(())
}

pub fn current_year() -> i32 {
    Local::now().year()
}
