pub mod evaluator;
pub mod feature_builder;
pub mod forecast_engine;
pub mod gap_synchronizer;
pub mod location_encoder;

pub use evaluator::{EvaluationReport, Evaluator, TargetMetrics};
pub use feature_builder::{FeatureBuilder, FeatureRequest};
pub use forecast_engine::{ForecastBatch, ForecastContext, ForecastEngine};
pub use gap_synchronizer::{missing_dates, FetchCell, GapSynchronizer, SyncReport};
pub use location_encoder::LocationEncoder;
