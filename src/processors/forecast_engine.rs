use chrono::{Duration, NaiveDate};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::analyzers::HeatRiskDeriver;
use crate::error::{ForecastError, Result};
use crate::models::{BatchResult, ForecastRecord, Observation, ObservationStore, Target, TimeSeries};
use crate::processors::{FeatureBuilder, LocationEncoder};
use crate::regression::ModelSet;
use crate::utils::constants::DEFAULT_HORIZON;

/// Per-location outcome of a forecasting run.
pub type ForecastBatch = BatchResult<String, Vec<ForecastRecord>>;

/// Everything a forecasting run reads. Built once, never mutated.
pub struct ForecastContext {
    models: ModelSet,
    builder: FeatureBuilder,
    deriver: HeatRiskDeriver,
    horizon: usize,
}

impl ForecastContext {
    pub fn new(models: ModelSet, encoder: LocationEncoder) -> Self {
        Self {
            models,
            builder: FeatureBuilder::new(encoder),
            deriver: HeatRiskDeriver::new(),
            horizon: DEFAULT_HORIZON,
        }
    }

    /// Use the models' recorded location vocabulary, or fit one from the
    /// store's locations when none was recorded.
    pub fn for_store(models: ModelSet, store: &ObservationStore) -> Self {
        let encoder = match models.location_vocabulary() {
            Some(vocabulary) => LocationEncoder::from_vocabulary(vocabulary),
            None => {
                warn!("Model artifacts carry no location vocabulary; fitting codes from the store");
                LocationEncoder::fit(store.locations())
            }
        };
        Self::new(models, encoder)
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn models(&self) -> &ModelSet {
        &self.models
    }

    pub fn builder(&self) -> &FeatureBuilder {
        &self.builder
    }
}

/// Recursive multi-day, multi-target forecaster.
pub struct ForecastEngine<'a> {
    context: &'a ForecastContext,
    max_workers: usize,
}

impl<'a> ForecastEngine<'a> {
    pub fn new(context: &'a ForecastContext) -> Self {
        Self {
            context,
            max_workers: num_cpus::get(),
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Forecast every location in the store.
    ///
    /// Fails outright if a model needs a feature the builder cannot derive;
    /// otherwise each location succeeds or fails independently.
    pub fn forecast_store(&self, store: &ObservationStore) -> Result<ForecastBatch> {
        for (_, model) in self.context.models.iter() {
            self.context.builder.check_model(model.as_ref())?;
        }

        let series = store.all_series()?;
        info!(
            locations = series.len(),
            horizon = self.context.horizon,
            "Starting forecast run"
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()?;

        let outcomes: Vec<(String, Result<Vec<ForecastRecord>>)> = pool.install(|| {
            series
                .par_iter()
                .map(|s| (s.location().to_string(), self.forecast_series(s)))
                .collect()
        });

        let batch: ForecastBatch = outcomes.into_iter().collect();
        for failure in &batch.failures {
            warn!(location = %failure.key, error = %failure.error, "Forecast failed for location");
        }

        Ok(batch)
    }

    /// Forecast one location from its own history.
    ///
    /// Features are seeded from the last complete observation, but forecast
    /// dates always start the day after the location's last observed date,
    /// so no observed day is forecast again.
    pub fn forecast_series(&self, series: &TimeSeries) -> Result<Vec<ForecastRecord>> {
        let history: Vec<Observation> = series
            .observations()
            .iter()
            .filter(|o| o.is_complete())
            .cloned()
            .collect();

        let (Some(seed), Some(last_date)) = (history.last(), series.last_date()) else {
            return Err(ForecastError::MissingData(format!(
                "no complete observations for {}",
                series.location()
            )));
        };

        if seed.date < last_date {
            debug!(
                location = series.location(),
                seed = %seed.date,
                %last_date,
                "Seeding forecast from an earlier complete day"
            );
        }

        self.forecast_from(history, last_date)
    }

    /// The feedback loop. `history` becomes this location's private
    /// working buffer; predicted days are appended to it and nothing else.
    fn forecast_from(
        &self,
        mut history: Vec<Observation>,
        last_date: NaiveDate,
    ) -> Result<Vec<ForecastRecord>> {
        let builder = &self.context.builder;
        let horizon = self.context.horizon;
        let mut records = Vec::with_capacity(horizon);

        let mut context = builder.serving_row(&history, last_date + Duration::days(1))?;

        for step in 1..=horizon {
            let date = last_date + Duration::days(step as i64);
            FeatureBuilder::set_date(&mut context, date);

            let mut predicted = Observation::new(context.location.clone(), date);
            let mut values = [0.0; 4];

            for target in Target::ALL {
                let model = self.context.models.get(target);
                let features = context.select(target, model.feature_names())?;
                let value = model.predict(&features)?;

                context.set(target.column(), value);
                context.set(target.lag_feature(1), value);
                predicted.set_value(target, Some(value));
                values[target.index()] = value;
            }

            let tempmax = values[Target::TempMax.index()];
            let humidity = values[Target::Humidity.index()];
            let (heat_index, risk_level) = self.context.deriver.assess(tempmax, humidity);

            records.push(ForecastRecord {
                location: predicted.location.clone(),
                date,
                tempmax,
                humidity,
                dew: values[Target::Dew.index()],
                solarradiation: values[Target::SolarRadiation.index()],
                heat_index: heat_index as i32,
                risk_level,
            });

            builder.refresh_trailing(&mut context, &history, |target| values[target.index()]);
            history.push(predicted);
        }

        debug!(
            location = %context.location,
            days = records.len(),
            "Completed location forecast"
        );
        Ok(records)
    }
}
