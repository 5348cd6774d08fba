//! Lag, rolling-mean and calendar features.
//!
//! Two policies for short history:
//! * the batch path (training and evaluation) drops any row where a
//!   requested feature is undefined;
//! * the serving path always yields a row for the next day, substituting
//!   the most recent value of the variable for undefined lags and means.

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::error::{ForecastError, Result};
use crate::models::{FeatureRow, Observation, Target, TimeSeries};
use crate::processors::LocationEncoder;
use crate::regression::Regressor;
use crate::utils::constants::{
    FEATURE_DAY_OF_YEAR, FEATURE_LOCATION, FEATURE_MONTH, LAG_OFFSETS, ROLLING_WINDOW,
};

/// Columns to produce for one target in the batch path.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRequest {
    pub target: Target,
    pub columns: Vec<String>,
}

impl FeatureRequest {
    pub fn new(target: Target, columns: Vec<String>) -> Self {
        Self { target, columns }
    }

    /// The model's declared features plus the target's own column.
    pub fn for_model(model: &dyn Regressor) -> Self {
        let target = model.target();
        let mut columns = model.feature_names().to_vec();
        if !columns.iter().any(|c| c == target.column()) {
            columns.push(target.column().to_string());
        }
        Self { target, columns }
    }

    /// Also require all four base variables, so rows with any missing
    /// observation are dropped.
    pub fn with_base_columns(mut self) -> Self {
        for target in Target::ALL {
            if !self.columns.iter().any(|c| c == target.column()) {
                self.columns.push(target.column().to_string());
            }
        }
        self
    }
}

pub struct FeatureBuilder {
    encoder: LocationEncoder,
}

impl FeatureBuilder {
    pub fn new(encoder: LocationEncoder) -> Self {
        Self { encoder }
    }

    pub fn encoder(&self) -> &LocationEncoder {
        &self.encoder
    }

    /// Whether `name` is a feature this builder knows how to derive.
    pub fn can_derive(name: &str) -> bool {
        if [FEATURE_LOCATION, FEATURE_MONTH, FEATURE_DAY_OF_YEAR].contains(&name) {
            return true;
        }

        Target::ALL.iter().any(|target| {
            name == target.column()
                || target.rolling_feature() == Some(name)
                || LAG_OFFSETS.iter().any(|lag| name == target.lag_feature(*lag))
        })
    }

    /// Fail with `FeatureMismatch` if `model` needs a feature we cannot derive.
    pub fn check_model(&self, model: &dyn Regressor) -> Result<()> {
        match model.feature_names().iter().find(|f| !Self::can_derive(f)) {
            Some(feature) => Err(ForecastError::FeatureMismatch {
                target: model.target(),
                feature: feature.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Batch path: one row per observation that defines every requested column.
    pub fn build_batch(
        &self,
        series: &TimeSeries,
        request: &FeatureRequest,
    ) -> Result<Vec<FeatureRow>> {
        if let Some(feature) = request.columns.iter().find(|c| !Self::can_derive(c)) {
            return Err(ForecastError::FeatureMismatch {
                target: request.target,
                feature: feature.clone(),
            });
        }

        let observations = series.observations();
        let mut rows = Vec::with_capacity(observations.len());

        for index in 0..observations.len() {
            let mut row = FeatureRow::new(series.location(), observations[index].date);
            let complete = request.columns.iter().all(|column| {
                match self.batch_value(observations, index, column) {
                    Some(value) => {
                        row.set(column.clone(), value);
                        true
                    }
                    None => false,
                }
            });

            if complete {
                rows.push(row);
            }
        }

        debug!(
            location = series.location(),
            target = %request.target,
            kept = rows.len(),
            dropped = observations.len() - rows.len(),
            "Built batch features"
        );
        Ok(rows)
    }

    /// Batch path over several series, concatenated in input order.
    pub fn build_batch_all(
        &self,
        series: &[TimeSeries],
        request: &FeatureRequest,
    ) -> Result<Vec<FeatureRow>> {
        let mut rows = Vec::new();
        for s in series {
            rows.extend(self.build_batch(s, request)?);
        }
        Ok(rows)
    }

    /// Value of `column` at `index`, or `None` when history is too short
    /// or an input is missing.
    fn batch_value(&self, observations: &[Observation], index: usize, column: &str) -> Option<f64> {
        let current = &observations[index];

        match column {
            FEATURE_LOCATION => return self.encoder.encode(&current.location),
            FEATURE_MONTH => return Some(current.date.month() as f64),
            FEATURE_DAY_OF_YEAR => return Some(current.date.ordinal() as f64),
            _ => {}
        }

        for target in Target::ALL {
            if column == target.column() {
                return current.value(target);
            }

            if target.rolling_feature() == Some(column) {
                if index + 1 < ROLLING_WINDOW {
                    return None;
                }
                let window = &observations[index + 1 - ROLLING_WINDOW..=index];
                let values: Option<Vec<f64>> = window.iter().map(|o| o.value(target)).collect();
                return values.map(|v| mean(&v));
            }

            for lag in LAG_OFFSETS {
                if column == target.lag_feature(lag) {
                    return index
                        .checked_sub(lag)
                        .and_then(|i| observations[i].value(target));
                }
            }
        }

        None
    }

    /// Serving path: the feature row of the last day in `history`, re-dated
    /// to `date`. Lags are read relative to that last day and the 3-day
    /// means end on it. Undefined lags and means take the day's own value.
    pub fn serving_row(&self, history: &[Observation], date: NaiveDate) -> Result<FeatureRow> {
        let last = history.last().ok_or_else(|| {
            ForecastError::MissingData("no complete observations to seed forecast".to_string())
        })?;
        let last_index = history.len() - 1;

        let mut row = FeatureRow::new(last.location.clone(), date);
        if let Some(code) = self.encoder.encode(&last.location) {
            row.set(FEATURE_LOCATION, code);
        }
        Self::set_date(&mut row, date);

        for target in Target::ALL {
            let latest = Self::latest_value(history, target).ok_or_else(|| {
                ForecastError::MissingData(format!(
                    "no {} values in history for {}",
                    target, last.location
                ))
            })?;
            row.set(target.column(), latest);

            for lag in LAG_OFFSETS {
                let value = last_index
                    .checked_sub(lag)
                    .and_then(|i| history[i].value(target))
                    .unwrap_or(latest);
                row.set(target.lag_feature(lag), value);
            }

            if let Some(name) = target.rolling_feature() {
                row.set(name, Self::trailing_mean(history, target).unwrap_or(latest));
            }
        }

        Ok(row)
    }

    /// Overwrite the date and the calendar features derived from it.
    pub fn set_date(row: &mut FeatureRow, date: NaiveDate) {
        row.date = date;
        row.set(FEATURE_MONTH, date.month() as f64);
        row.set(FEATURE_DAY_OF_YEAR, date.ordinal() as f64);
    }

    /// Recompute lag-7, lag-14 and rolling means from `history` as it
    /// stands before the current step's row is appended. When history is
    /// too shallow, `fallback(target)` is used instead.
    pub fn refresh_trailing<F>(&self, row: &mut FeatureRow, history: &[Observation], fallback: F)
    where
        F: Fn(Target) -> f64,
    {
        let depth = history.len();

        for target in Target::ALL {
            let fallback_value = fallback(target);

            for lag in LAG_OFFSETS.into_iter().filter(|lag| *lag > 1) {
                let value = if depth >= lag {
                    history[depth - lag].value(target).unwrap_or(fallback_value)
                } else {
                    fallback_value
                };
                row.set(target.lag_feature(lag), value);
            }

            if let Some(name) = target.rolling_feature() {
                row.set(
                    name,
                    Self::trailing_mean(history, target).unwrap_or(fallback_value),
                );
            }
        }
    }

    /// Mean of the defined values among the last `ROLLING_WINDOW` rows, or
    /// `None` when fewer rows exist or none of them is defined.
    fn trailing_mean(history: &[Observation], target: Target) -> Option<f64> {
        if history.len() < ROLLING_WINDOW {
            return None;
        }
        let window: Vec<f64> = history[history.len() - ROLLING_WINDOW..]
            .iter()
            .filter_map(|o| o.value(target))
            .collect();
        if window.is_empty() {
            None
        } else {
            Some(mean(&window))
        }
    }

    fn latest_value(history: &[Observation], target: Target) -> Option<f64> {
        history.iter().rev().find_map(|o| o.value(target))
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
