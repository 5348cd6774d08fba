pub mod batch;
pub mod feature_row;
pub mod forecast;
pub mod location;
pub mod observation;
pub mod series;
pub mod store;
pub mod target;

pub use batch::{BatchResult, FailureDiagnostic, UnitFailure};
pub use feature_row::FeatureRow;
pub use forecast::ForecastRecord;
pub use location::Location;
pub use observation::Observation;
pub use series::TimeSeries;
pub use store::ObservationStore;
pub use target::Target;
