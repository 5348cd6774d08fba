use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// `intercept + Σ coefficient_i · x_i`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    pub fn new(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients,
        }
    }

    pub fn check_arity(&self, feature_count: usize) -> Result<()> {
        if self.coefficients.len() != feature_count {
            return Err(ForecastError::InvalidModel(format!(
                "linear model has {} coefficients for {} features",
                self.coefficients.len(),
                feature_count
            )));
        }
        Ok(())
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(features)
            .fold(self.intercept, |acc, (c, x)| acc + c * x)
    }
}
