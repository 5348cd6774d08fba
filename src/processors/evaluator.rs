//! Hold-out evaluation of the four target models.

use chrono::{Duration, NaiveDate};
use tracing::{info, warn};

use crate::error::{ForecastError, Result};
use crate::models::{BatchResult, ObservationStore, Target, TimeSeries, UnitFailure};
use crate::processors::{FeatureRequest, ForecastContext};
use crate::utils::constants::DEFAULT_HOLDOUT_DAYS;

/// Error metrics for one target over the hold-out rows.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetMetrics {
    pub target: Target,
    pub rows: usize,
    pub feature_count: usize,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
    /// `max(0, 100 - MAPE)`.
    pub accuracy: f64,
}

impl TargetMetrics {
    /// Compare predictions against actuals. Both slices must be non-empty
    /// and of equal length.
    pub fn compute(target: Target, feature_count: usize, actual: &[f64], predicted: &[f64]) -> Self {
        let n = actual.len() as f64;
        let errors: Vec<f64> = actual.iter().zip(predicted).map(|(a, p)| a - p).collect();

        let rmse = (errors.iter().map(|e| e * e).sum::<f64>() / n).sqrt();
        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

        let mean = actual.iter().sum::<f64>() / n;
        let ss_res: f64 = errors.iter().map(|e| e * e).sum();
        let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
        let r2 = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        };

        // Zero actuals have no defined percentage error.
        let percentage: Vec<f64> = actual
            .iter()
            .zip(&errors)
            .filter(|(a, _)| **a != 0.0)
            .map(|(a, e)| (e / a).abs())
            .collect();
        let accuracy = if percentage.is_empty() {
            0.0
        } else {
            let mape = percentage.iter().sum::<f64>() / percentage.len() as f64 * 100.0;
            (100.0 - mape).max(0.0)
        };

        Self {
            target,
            rows: actual.len(),
            feature_count,
            rmse,
            mae,
            r2,
            accuracy,
        }
    }
}

/// Outcome of an evaluation run.
#[derive(Debug)]
pub struct EvaluationReport {
    pub split_date: NaiveDate,
    pub holdout_days: i64,
    pub metrics: Vec<TargetMetrics>,
    pub failures: Vec<UnitFailure<Target>>,
}

impl EvaluationReport {
    /// Mean accuracy over the targets that could be evaluated.
    pub fn overall_accuracy(&self) -> Option<f64> {
        if self.metrics.is_empty() {
            return None;
        }
        Some(self.metrics.iter().map(|m| m.accuracy).sum::<f64>() / self.metrics.len() as f64)
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Hold-out evaluation: last {} days (after {})\n",
            self.holdout_days, self.split_date
        );

        for m in &self.metrics {
            summary.push_str(&format!(
                "\n{}\n  Rows          : {}\n  Feature count : {}\n  RMSE          : {:.3}\n  MAE           : {:.3}\n  R²            : {:.3}\n  Accuracy (%)  : {:.2}%\n",
                m.target, m.rows, m.feature_count, m.rmse, m.mae, m.r2, m.accuracy
            ));
        }

        for failure in &self.failures {
            summary.push_str(&format!("\n{}: not evaluated ({})\n", failure.key, failure.error));
        }

        match self.overall_accuracy() {
            Some(accuracy) => summary.push_str(&format!("\nOverall accuracy: {:.2}%", accuracy)),
            None => summary.push_str("\nOverall accuracy: n/a"),
        }
        summary
    }
}

/// Scores each model on the most recent `holdout_days` of the store.
pub struct Evaluator<'a> {
    context: &'a ForecastContext,
    holdout_days: i64,
}

impl<'a> Evaluator<'a> {
    pub fn new(context: &'a ForecastContext) -> Self {
        Self {
            context,
            holdout_days: DEFAULT_HOLDOUT_DAYS,
        }
    }

    pub fn with_holdout_days(mut self, holdout_days: i64) -> Self {
        self.holdout_days = holdout_days.max(1);
        self
    }

    pub fn evaluate(&self, store: &ObservationStore) -> Result<EvaluationReport> {
        let last_date = store.last_date().ok_or(ForecastError::EmptyStore)?;
        let split_date = last_date - Duration::days(self.holdout_days);

        // Features are built on the hold-out slice alone.
        let test_slice = ObservationStore::new(
            store
                .observations()
                .iter()
                .filter(|o| o.date > split_date)
                .cloned()
                .collect(),
        );
        let series = test_slice.all_series()?;
        info!(%split_date, rows = test_slice.len(), "Evaluating on hold-out slice");

        let mut batch: BatchResult<Target, TargetMetrics> = BatchResult::new();
        for target in Target::ALL {
            batch.record(target, self.evaluate_target(target, &series));
        }

        for failure in &batch.failures {
            warn!(target = %failure.key, error = %failure.error, "Target could not be evaluated");
        }

        Ok(EvaluationReport {
            split_date,
            holdout_days: self.holdout_days,
            metrics: batch.successes,
            failures: batch.failures,
        })
    }

    fn evaluate_target(&self, target: Target, series: &[TimeSeries]) -> Result<TargetMetrics> {
        let model = self.context.models().get(target);
        let request = FeatureRequest::for_model(model.as_ref()).with_base_columns();
        let rows = self.context.builder().build_batch_all(series, &request)?;

        if rows.is_empty() {
            return Err(ForecastError::MissingData(format!(
                "no hold-out rows define every {} feature",
                target
            )));
        }

        let target_column = [target.column().to_string()];
        let mut actual = Vec::with_capacity(rows.len());
        let mut predicted = Vec::with_capacity(rows.len());

        for row in &rows {
            let features = row.select(target, model.feature_names())?;
            predicted.push(model.predict(&features)?);
            actual.extend(row.select(target, &target_column)?);
        }

        Ok(TargetMetrics::compute(
            target,
            model.feature_names().len(),
            &actual,
            &predicted,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Observation;
    use crate::processors::LocationEncoder;
    use crate::regression::{LinearModel, ModelArtifact, ModelBody, ModelSet, SharedRegressor};
    use std::sync::Arc;

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(n)
    }

    fn linear(target: Target, features: &[&str], coefficients: Vec<f64>) -> SharedRegressor {
        Arc::new(
            ModelArtifact::new(
                target,
                features.iter().map(|s| s.to_string()).collect(),
                ModelBody::Linear(LinearModel::new(0.0, coefficients)),
            )
            .unwrap(),
        )
    }

    /// Persistence models: exact on a constant series.
    fn persistence_models() -> ModelSet {
        ModelSet::new(vec![
            linear(Target::TempMax, &["tempmax_lag14"], vec![1.0]),
            linear(Target::Humidity, &["humidity_lag1"], vec![1.0]),
            linear(Target::Dew, &["dew_lag7", "location_enc"], vec![1.0, 0.0]),
            linear(Target::SolarRadiation, &["solarradiation_lag1"], vec![1.0]),
        ])
        .unwrap()
    }

    fn constant_store(days: i64) -> ObservationStore {
        let rows = ["colombo", "kaduwela"]
            .iter()
            .flat_map(|l| (0..days).map(move |i| Observation::with_values(*l, day(i), 31.0, 80.0, 24.0, 210.0)))
            .collect();
        ObservationStore::new(rows)
    }

    fn context(models: ModelSet) -> ForecastContext {
        ForecastContext::new(models, LocationEncoder::fit(["colombo", "kaduwela"]))
    }

    #[test]
    fn test_perfect_models_score_full_accuracy() -> Result<()> {
        let context = context(persistence_models());
        let report = Evaluator::new(&context).evaluate(&constant_store(100))?;

        assert_eq!(report.split_date, day(39));
        assert!(report.failures.is_empty());
        assert_eq!(report.metrics.len(), 4);

        let tempmax = &report.metrics[0];
        assert_eq!(tempmax.target, Target::TempMax);
        // 60 hold-out days per location, the first 14 lack a lag-14 value.
        assert_eq!(tempmax.rows, 2 * 46);
        assert_eq!(tempmax.rmse, 0.0);
        assert_eq!(tempmax.r2, 1.0);
        assert_eq!(tempmax.accuracy, 100.0);

        assert_eq!(report.metrics[1].rows, 2 * 59);
        assert_eq!(report.metrics[2].feature_count, 2);
        assert_eq!(report.overall_accuracy(), Some(100.0));
        Ok(())
    }

    #[test]
    fn test_target_without_rows_is_reported_as_failure() -> Result<()> {
        let context = context(persistence_models());
        let report = Evaluator::new(&context)
            .with_holdout_days(7)
            .evaluate(&constant_store(100))?;

        // Lag-14 and lag-7 are undefined inside a seven-day slice.
        let failed: Vec<Target> = report.failures.iter().map(|f| f.key).collect();
        assert_eq!(failed, vec![Target::TempMax, Target::Dew]);
        assert_eq!(report.metrics.len(), 2);
        assert!(report.summary().contains("tempmax: not evaluated"));
        Ok(())
    }

    #[test]
    fn test_rows_with_any_missing_observation_are_skipped() -> Result<()> {
        let mut rows = constant_store(100).observations().to_vec();
        // Colombo's last five days lack solar radiation.
        for row in rows.iter_mut().filter(|o| o.location == "colombo" && o.date >= day(95)) {
            row.solarradiation = None;
        }
        let store = ObservationStore::new(rows);

        let context = context(persistence_models());
        let report = Evaluator::new(&context).evaluate(&store)?;

        // The tempmax model never reads solar radiation, yet those days are dropped.
        assert_eq!(report.metrics[0].target, Target::TempMax);
        assert_eq!(report.metrics[0].rows, 2 * 46 - 5);
        Ok(())
    }

    #[test]
    fn test_empty_store_is_an_error() {
        let context = context(persistence_models());
        let result = Evaluator::new(&context).evaluate(&ObservationStore::default());
        assert!(matches!(result, Err(ForecastError::EmptyStore)));
    }

    #[test]
    fn test_metric_values() {
        let actual = [10.0, 20.0, 30.0, 40.0];
        let predicted = [12.0, 18.0, 33.0, 37.0];
        let m = TargetMetrics::compute(Target::Dew, 3, &actual, &predicted);

        assert!((m.mae - 2.5).abs() < 1e-9);
        assert!((m.rmse - (26.0f64 / 4.0).sqrt()).abs() < 1e-9);
        // ss_res = 26, ss_tot = 500
        assert!((m.r2 - (1.0 - 26.0 / 500.0)).abs() < 1e-9);
        // MAPE = (0.2 + 0.1 + 0.1 + 0.075) / 4 * 100 = 11.875
        assert!((m.accuracy - 88.125).abs() < 1e-9);
    }

    #[test]
    fn test_accuracy_floors_at_zero() {
        let m = TargetMetrics::compute(Target::Humidity, 1, &[1.0, 2.0], &[5.0, 9.0]);
        assert_eq!(m.accuracy, 0.0);
        assert!(m.r2 < 0.0);
    }
}
