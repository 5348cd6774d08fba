pub mod constants;
pub mod dates;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use dates::parse_lenient_date;
pub use filename::generate_default_forecast_filename;
pub use progress::ProgressReporter;
