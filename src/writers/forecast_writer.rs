use csv::WriterBuilder;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::error::{ForecastError, Result};
use crate::models::{FailureDiagnostic, ForecastRecord};

/// Forecast output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(ForecastError::InvalidFormat(format!(
                "Unsupported output format: '{}' (expected json or csv)",
                other
            ))),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

/// Forecast records plus per-location diagnostics.
#[derive(Debug, Serialize)]
pub struct ForecastDocument<'a> {
    pub forecasts: &'a [ForecastRecord],
    pub errors: &'a [FailureDiagnostic],
}

pub struct ForecastWriter {
    format: OutputFormat,
}

impl ForecastWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn write_file(
        &self,
        records: &[ForecastRecord],
        errors: &[FailureDiagnostic],
        path: &Path,
    ) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = std::fs::File::create(path)?;
        self.write_to(records, errors, std::io::BufWriter::new(file))
    }

    /// CSV output carries only the records; diagnostics are JSON-only.
    pub fn write_to<W: Write>(
        &self,
        records: &[ForecastRecord],
        errors: &[FailureDiagnostic],
        mut sink: W,
    ) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let document = ForecastDocument {
                    forecasts: records,
                    errors,
                };
                serde_json::to_writer_pretty(&mut sink, &document)?;
                writeln!(sink)?;
            }
            OutputFormat::Csv => {
                let mut writer = WriterBuilder::new().from_writer(sink);
                for record in records {
                    writer.serialize(record)?;
                }
                writer.flush()?;
            }
        }
        Ok(())
    }
}
