use csv::WriterBuilder;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::Result;
use crate::models::Observation;

#[derive(Serialize)]
struct StoreRow<'a> {
    location: &'a str,
    datetime: String,
    tempmax: Option<f64>,
    humidity: Option<f64>,
    dew: Option<f64>,
    solarradiation: Option<f64>,
}

impl<'a> From<&'a Observation> for StoreRow<'a> {
    fn from(observation: &'a Observation) -> Self {
        Self {
            location: &observation.location,
            datetime: observation.date.format("%Y-%m-%d").to_string(),
            tempmax: observation.tempmax,
            humidity: observation.humidity,
            dew: observation.dew,
            solarradiation: observation.solarradiation,
        }
    }
}

/// Writes the full observation table. There is no append mode.
pub struct ObservationWriter {
    delimiter: u8,
}

impl ObservationWriter {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Rewrite `path` with `observations`. The table is written to a
    /// sibling temp file first and renamed over the target.
    pub fn write_observations(&self, observations: &[Observation], path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let mut temp_file = NamedTempFile::new_in(parent)?;
        self.write_to(observations, temp_file.as_file_mut())?;
        temp_file.as_file_mut().flush()?;
        temp_file.persist(path).map_err(|e| e.error)?;

        debug!(path = %path.display(), rows = observations.len(), "Persisted observation store");
        Ok(())
    }

    pub fn write_to<W: Write>(&self, observations: &[Observation], sink: W) -> Result<()> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(sink);

        for observation in observations {
            writer.serialize(StoreRow::from(observation))?;
        }

        writer.flush()?;
        Ok(())
    }
}

impl Default for ObservationWriter {
    fn default() -> Self {
        Self::new()
    }
}
