use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Target;

/// One daily record for one location. Identified by `(location, date)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub location: String,
    pub date: NaiveDate,
    pub tempmax: Option<f64>,
    pub humidity: Option<f64>,
    pub dew: Option<f64>,
    pub solarradiation: Option<f64>,
}

impl Observation {
    pub fn new(location: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            location: location.into(),
            date,
            tempmax: None,
            humidity: None,
            dew: None,
            solarradiation: None,
        }
    }

    pub fn with_values(
        location: impl Into<String>,
        date: NaiveDate,
        tempmax: f64,
        humidity: f64,
        dew: f64,
        solarradiation: f64,
    ) -> Self {
        Self {
            location: location.into(),
            date,
            tempmax: Some(tempmax),
            humidity: Some(humidity),
            dew: Some(dew),
            solarradiation: Some(solarradiation),
        }
    }

    pub fn value(&self, target: Target) -> Option<f64> {
        match target {
            Target::TempMax => self.tempmax,
            Target::Humidity => self.humidity,
            Target::Dew => self.dew,
            Target::SolarRadiation => self.solarradiation,
        }
    }

    pub fn set_value(&mut self, target: Target, value: Option<f64>) {
        match target {
            Target::TempMax => self.tempmax = value,
            Target::Humidity => self.humidity = value,
            Target::Dew => self.dew = value,
            Target::SolarRadiation => self.solarradiation = value,
        }
    }

    pub fn is_complete(&self) -> bool {
        Target::ALL.iter().all(|t| self.value(*t).is_some())
    }
}
