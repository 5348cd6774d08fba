use chrono::NaiveDate;
use std::collections::HashMap;

use crate::error::{ForecastError, Result};
use crate::models::Target;

/// Named feature values for one (location, date).
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub location: String,
    pub date: NaiveDate,
    values: HashMap<String, f64>,
}

impl FeatureRow {
    pub fn new(location: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            location: location.into(),
            date,
            values: HashMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values for `names`, in that order, as input for `target`'s model.
    pub fn select(&self, target: Target, names: &[String]) -> Result<Vec<f64>> {
        names
            .iter()
            .map(|name| {
                self.get(name).ok_or_else(|| ForecastError::MissingFeature {
                    target,
                    feature: name.clone(),
                })
            })
            .collect()
    }
}
