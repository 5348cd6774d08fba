use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{ForecastError, Result};
use crate::models::Observation;
use crate::utils::constants::{COL_DATETIME, COL_LOCATION};
use crate::utils::dates::parse_lenient_date;

/// Raw store row before date parsing. Unparsable numbers load as missing.
#[derive(Debug, Deserialize)]
struct RawObservationRow {
    location: String,
    datetime: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    tempmax: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    humidity: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    dew: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    solarradiation: Option<f64>,
}

/// Observations read from a store file.
#[derive(Debug)]
pub struct LoadedObservations {
    pub observations: Vec<Observation>,
    /// Rows dropped because their date could not be parsed.
    pub discarded_rows: usize,
}

pub struct ObservationReader {
    delimiter: u8,
}

impl ObservationReader {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Read the observation table from a CSV file
    pub fn read_observations(&self, path: &Path) -> Result<LoadedObservations> {
        let file = std::fs::File::open(path)?;
        let loaded = self.read_from(file)?;

        if loaded.discarded_rows > 0 {
            warn!(
                path = %path.display(),
                discarded = loaded.discarded_rows,
                "Discarded store rows with unparsable dates"
            );
        }

        Ok(loaded)
    }

    pub fn read_from<R: Read>(&self, source: R) -> Result<LoadedObservations> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .trim(Trim::All)
            .flexible(true)
            .from_reader(source);

        let headers = reader.headers()?.clone();
        Self::check_headers(&headers)?;

        let mut observations = Vec::new();
        let mut discarded_rows = 0;

        for (index, row) in reader.deserialize::<RawObservationRow>().enumerate() {
            let row = row?;

            let Some(date) = parse_lenient_date(&row.datetime) else {
                debug!(row = index + 2, value = %row.datetime, "Skipping row with unparsable date");
                discarded_rows += 1;
                continue;
            };

            observations.push(Observation {
                location: row.location,
                date,
                tempmax: row.tempmax,
                humidity: row.humidity,
                dew: row.dew,
                solarradiation: row.solarradiation,
            });
        }

        Ok(LoadedObservations {
            observations,
            discarded_rows,
        })
    }

    fn check_headers(headers: &StringRecord) -> Result<()> {
        for required in [COL_LOCATION, COL_DATETIME] {
            if !headers.iter().any(|h| h == required) {
                return Err(ForecastError::InvalidFormat(format!(
                    "Observation store is missing the '{}' column",
                    required
                )));
            }
        }
        Ok(())
    }
}

impl Default for ObservationReader {
    fn default() -> Self {
        Self::new()
    }
}
