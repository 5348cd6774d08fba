use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ForecastError;

/// The four daily variables the engine predicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    TempMax,
    Humidity,
    Dew,
    SolarRadiation,
}

impl Target {
    /// Prediction order within one forecast step. Later targets see the
    /// same-day values of earlier ones.
    pub const ALL: [Target; 4] = [
        Target::TempMax,
        Target::Humidity,
        Target::Dew,
        Target::SolarRadiation,
    ];

    /// Position in `ALL`.
    pub fn index(&self) -> usize {
        match self {
            Target::TempMax => 0,
            Target::Humidity => 1,
            Target::Dew => 2,
            Target::SolarRadiation => 3,
        }
    }

    /// Column name in the observation store and base name for lag features.
    pub fn column(&self) -> &'static str {
        match self {
            Target::TempMax => "tempmax",
            Target::Humidity => "humidity",
            Target::Dew => "dew",
            Target::SolarRadiation => "solarradiation",
        }
    }

    /// Name of the trailing 3-day mean feature, for the variables that have one.
    pub fn rolling_feature(&self) -> Option<&'static str> {
        match self {
            Target::TempMax => Some("temp_roll3"),
            Target::Humidity => Some("hum_roll3"),
            Target::Dew => Some("dew_roll3"),
            Target::SolarRadiation => None,
        }
    }

    pub fn lag_feature(&self, lag: usize) -> String {
        format!("{}_lag{}", self.column(), lag)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Target {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tempmax" => Ok(Target::TempMax),
            "humidity" => Ok(Target::Humidity),
            "dew" => Ok(Target::Dew),
            "solarradiation" => Ok(Target::SolarRadiation),
            other => Err(ForecastError::InvalidFormat(format!(
                "Unknown target variable: '{}'",
                other
            ))),
        }
    }
}
