use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::path::Path;

use crate::error::Result;
use crate::models::{Observation, TimeSeries};
use crate::readers::ObservationReader;
use crate::writers::ObservationWriter;

/// In-memory copy of the historical observation table.
///
/// The table is read whole, mutated, and rewritten whole. Callers must
/// serialize concurrent synchronization runs against the same file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationStore {
    observations: Vec<Observation>,
}

impl ObservationStore {
    pub fn new(observations: Vec<Observation>) -> Self {
        let mut store = Self { observations };
        store.sort();
        store
    }

    /// Load the table, discarding rows whose date cannot be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let loaded = ObservationReader::new().read_observations(path)?;
        Ok(Self::new(loaded.observations))
    }

    /// Rewrite the full table at `path`.
    pub fn persist(&self, path: &Path) -> Result<()> {
        ObservationWriter::new().write_observations(&self.observations, path)
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.iter().map(|o| o.date).max()
    }

    /// Distinct location names in sorted order.
    pub fn locations(&self) -> Vec<String> {
        self.observations
            .iter()
            .map(|o| o.location.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn series(&self, location: &str) -> Result<TimeSeries> {
        let rows = self
            .observations
            .iter()
            .filter(|o| o.location == location)
            .cloned()
            .collect();
        TimeSeries::new(location, rows)
    }

    pub fn all_series(&self) -> Result<Vec<TimeSeries>> {
        self.locations()
            .iter()
            .map(|location| self.series(location))
            .collect()
    }

    /// Append rows and restore (location, date) order.
    pub fn append(&mut self, rows: Vec<Observation>) {
        self.observations.extend(rows);
        self.sort();
    }

    /// Sort by (location, date). For duplicate keys the most recently
    /// appended row wins.
    pub fn sort(&mut self) {
        self.observations.sort_by(|a, b| {
            a.location
                .cmp(&b.location)
                .then_with(|| a.date.cmp(&b.date))
        });

        let mut deduped: Vec<Observation> = Vec::with_capacity(self.observations.len());
        for observation in self.observations.drain(..) {
            match deduped.last_mut() {
                Some(last)
                    if last.location == observation.location && last.date == observation.date =>
                {
                    *last = observation;
                }
                _ => deduped.push(observation),
            }
        }
        self.observations = deduped;
    }
}
