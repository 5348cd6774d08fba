pub mod forecast_writer;
pub mod observation_writer;

pub use forecast_writer::{ForecastDocument, ForecastWriter, OutputFormat};
pub use observation_writer::ObservationWriter;
