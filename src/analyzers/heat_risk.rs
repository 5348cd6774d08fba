//! Heat index and heat-risk banding.
//!
//! The index uses the NOAA Rothfusz regression, which is defined in
//! Fahrenheit; inputs and outputs here are Celsius.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::constants::{
    RISK_CAUTION_MAX, RISK_DANGER_MAX, RISK_EXTREME_CAUTION_MAX, RISK_NORMAL_MAX,
};

/// Ordered severity bands for a heat index value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Normal,
    Caution,
    #[serde(rename = "Extreme Caution")]
    ExtremeCaution,
    Danger,
    #[serde(rename = "Extreme Danger")]
    ExtremeDanger,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Normal => "Normal",
            RiskLevel::Caution => "Caution",
            RiskLevel::ExtremeCaution => "Extreme Caution",
            RiskLevel::Danger => "Danger",
            RiskLevel::ExtremeDanger => "Extreme Danger",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stateless heat index calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeatRiskDeriver;

impl HeatRiskDeriver {
    pub fn new() -> Self {
        Self
    }

    /// Apparent temperature in °C, rounded half-to-even to a whole degree.
    pub fn heat_index(&self, temp_c: f64, humidity_pct: f64) -> f64 {
        let t = temp_c * 9.0 / 5.0 + 32.0;
        let rh = humidity_pct;

        let hi_f = -42.379 + 2.04901523 * t + 10.14333127 * rh
            - 0.22475541 * t * rh
            - 6.83783e-3 * t * t
            - 5.481717e-2 * rh * rh
            + 1.22874e-3 * t * t * rh
            + 8.5282e-4 * t * rh * rh
            - 1.99e-6 * t * t * rh * rh;

        ((hi_f - 32.0) * 5.0 / 9.0).round_ties_even()
    }

    /// Upper bounds are exclusive; everything from 51 °C up is the top band.
    pub fn classify(&self, heat_index_c: f64) -> RiskLevel {
        if heat_index_c < RISK_NORMAL_MAX {
            RiskLevel::Normal
        } else if heat_index_c < RISK_CAUTION_MAX {
            RiskLevel::Caution
        } else if heat_index_c < RISK_EXTREME_CAUTION_MAX {
            RiskLevel::ExtremeCaution
        } else if heat_index_c < RISK_DANGER_MAX {
            RiskLevel::Danger
        } else {
            RiskLevel::ExtremeDanger
        }
    }

    pub fn assess(&self, temp_c: f64, humidity_pct: f64) -> (f64, RiskLevel) {
        let index = self.heat_index(temp_c, humidity_pct);
        (index, self.classify(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_heat_index() {
        let deriver = HeatRiskDeriver::new();
        // 89.6 °F at 70 % gives 104.74 °F, i.e. 40.41 °C.
        assert_eq!(deriver.heat_index(32.0, 70.0), 40.0);
        assert_eq!(deriver.classify(40.0), RiskLevel::ExtremeCaution);

        assert_eq!(deriver.heat_index(30.0, 50.0), 31.0);
        assert_eq!(deriver.heat_index(35.0, 60.0), 45.0);
        assert_eq!(deriver.heat_index(28.0, 90.0), 34.0);
    }

    #[test]
    fn test_heat_index_is_deterministic() {
        let deriver = HeatRiskDeriver::new();
        let first = deriver.heat_index(33.7, 81.2);
        let second = deriver.heat_index(33.7, 81.2);
        assert_eq!(first.to_bits(), second.to_bits());
        assert_eq!(first.fract(), 0.0);
    }

    #[test]
    fn test_classification_boundaries() {
        let deriver = HeatRiskDeriver::new();
        assert_eq!(deriver.classify(26.999), RiskLevel::Normal);
        assert_eq!(deriver.classify(27.0), RiskLevel::Caution);
        assert_eq!(deriver.classify(32.999), RiskLevel::Caution);
        assert_eq!(deriver.classify(33.0), RiskLevel::ExtremeCaution);
        assert_eq!(deriver.classify(41.0), RiskLevel::Danger);
        assert_eq!(deriver.classify(50.999), RiskLevel::Danger);
        assert_eq!(deriver.classify(51.0), RiskLevel::ExtremeDanger);
        assert_eq!(deriver.classify(-5.0), RiskLevel::Normal);
    }

    #[test]
    fn test_risk_level_labels() {
        assert_eq!(RiskLevel::ExtremeDanger.to_string(), "Extreme Danger");
        assert_eq!(
            serde_json::to_string(&RiskLevel::ExtremeCaution).unwrap(),
            "\"Extreme Caution\""
        );
        assert!(RiskLevel::Danger > RiskLevel::Caution);
    }
}
