use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use heatcast::models::{Observation, ObservationStore, Target};
use heatcast::processors::{FeatureBuilder, FeatureRequest, ForecastContext, ForecastEngine, LocationEncoder};
use heatcast::regression::{LinearModel, ModelArtifact, ModelBody, ModelSet, SharedRegressor};
use std::sync::Arc;

fn create_store(location_count: usize, days: i64) -> ObservationStore {
    let start = NaiveDate::from_ymd_opt(2016, 1, 1).unwrap();
    let mut rows = Vec::with_capacity(location_count * days as usize);

    for l in 0..location_count {
        for d in 0..days {
            let x = (d as f64 / 365.0 * std::f64::consts::TAU).sin();
            rows.push(Observation::with_values(
                format!("division-{}", l),
                start + Duration::days(d),
                31.0 + 2.0 * x + l as f64 * 0.1,
                78.0 - 5.0 * x,
                24.0 + x,
                200.0 + 30.0 * x,
            ));
        }
    }

    ObservationStore::new(rows)
}

fn linear(target: Target, features: &[&str]) -> SharedRegressor {
    let coefficients = vec![0.05; features.len()];
    Arc::new(
        ModelArtifact::new(
            target,
            features.iter().map(|s| s.to_string()).collect(),
            ModelBody::Linear(LinearModel::new(1.0, coefficients)),
        )
        .unwrap(),
    )
}

fn create_models() -> ModelSet {
    ModelSet::new(vec![
        linear(
            Target::TempMax,
            &[
                "location_enc", "month", "dayofyear", "tempmax_lag1", "tempmax_lag7",
                "tempmax_lag14", "humidity_lag1", "humidity_lag7", "dew_lag1", "dew_lag7",
                "temp_roll3", "hum_roll3",
            ],
        ),
        linear(
            Target::Humidity,
            &[
                "location_enc", "month", "dayofyear", "humidity_lag1", "humidity_lag7",
                "humidity_lag14", "tempmax_lag1", "tempmax_lag7", "hum_roll3",
            ],
        ),
        linear(
            Target::Dew,
            &[
                "location_enc", "month", "dayofyear", "dew_lag1", "dew_lag7", "dew_lag14",
                "tempmax_lag1", "tempmax_lag7", "humidity",
            ],
        ),
        linear(
            Target::SolarRadiation,
            &[
                "location_enc", "month", "dayofyear", "solarradiation_lag1",
                "solarradiation_lag7", "solarradiation_lag14",
            ],
        ),
    ])
    .unwrap()
}

fn benchmark_feature_builder(c: &mut Criterion) {
    let mut group = c.benchmark_group("feature_builder");
    let models = create_models();

    for days in [365, 3650] {
        let store = create_store(13, days);
        let series = store.all_series().unwrap();
        let builder = FeatureBuilder::new(LocationEncoder::fit(store.locations()));
        let request = FeatureRequest::for_model(models.get(Target::TempMax).as_ref());

        group.bench_with_input(BenchmarkId::new("build_batch", days), &series, |b, series| {
            b.iter(|| builder.build_batch_all(black_box(series), black_box(&request)).unwrap())
        });
    }

    group.finish();
}

fn benchmark_forecast_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("forecast_engine");
    let store = create_store(13, 730);
    let context = ForecastContext::for_store(create_models(), &store);

    for workers in [1, 4] {
        group.bench_with_input(BenchmarkId::new("forecast_store", workers), &workers, |b, &workers| {
            let engine = ForecastEngine::new(&context).with_max_workers(workers);
            b.iter(|| engine.forecast_store(black_box(&store)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_feature_builder, benchmark_forecast_engine);
criterion_main!(benches);
