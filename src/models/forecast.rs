use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analyzers::RiskLevel;

/// One predicted day for one location. Never written back to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub location: String,
    pub date: NaiveDate,
    pub tempmax: f64,
    pub humidity: f64,
    pub dew: f64,
    pub solarradiation: f64,
    pub heat_index: i32,
    pub risk_level: RiskLevel,
}
