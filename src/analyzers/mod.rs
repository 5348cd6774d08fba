pub mod forecast_analyzer;
pub mod heat_risk;

pub use forecast_analyzer::{ForecastAnalyzer, ForecastStatistics, LocationPeak};
pub use heat_risk::{HeatRiskDeriver, RiskLevel};
