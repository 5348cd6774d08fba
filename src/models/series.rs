use chrono::NaiveDate;

use crate::error::{ForecastError, Result};
use crate::models::{Observation, Target};

/// Date-ordered observations for a single location.
///
/// Construction sorts by date and rejects mixed locations and duplicate
/// dates, so every `TimeSeries` is strictly increasing in `date`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    location: String,
    observations: Vec<Observation>,
}

impl TimeSeries {
    pub fn new(location: impl Into<String>, mut observations: Vec<Observation>) -> Result<Self> {
        let location = location.into();

        if let Some(stray) = observations.iter().find(|o| o.location != location) {
            return Err(ForecastError::InvalidFormat(format!(
                "Series for '{}' contains a row for '{}'",
                location, stray.location
            )));
        }

        observations.sort_by_key(|o| o.date);

        if let Some(pair) = observations.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(ForecastError::InvalidFormat(format!(
                "Series for '{}' has duplicate date {}",
                location, pair[0].date
            )));
        }

        Ok(Self {
            location,
            observations,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
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
        self.observations.last().map(|o| o.date)
    }

    pub fn values(&self, target: Target) -> Vec<Option<f64>> {
        self.observations.iter().map(|o| o.value(target)).collect()
    }

    /// Rows on or after `start`, keeping the series invariants.
    pub fn since(&self, start: NaiveDate) -> TimeSeries {
        TimeSeries {
            location: self.location.clone(),
            observations: self
                .observations
                .iter()
                .filter(|o| o.date >= start)
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(location: &str, day: u32) -> Observation {
        let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        Observation::with_values(location, date, 30.0, 80.0, 24.0, 200.0)
    }

    #[test]
    fn test_series_is_sorted() {
        let series = TimeSeries::new("colombo", vec![obs("colombo", 3), obs("colombo", 1)]).unwrap();
        assert_eq!(series.observations()[0].date.to_string(), "2024-01-01");
        assert_eq!(series.last_date().unwrap().to_string(), "2024-01-03");
    }

    #[test]
    fn test_series_rejects_duplicates_and_mixed_locations() {
        assert!(TimeSeries::new("colombo", vec![obs("colombo", 2), obs("colombo", 2)]).is_err());
        assert!(TimeSeries::new("colombo", vec![obs("colombo", 2), obs("padukka", 3)]).is_err());
    }

    #[test]
    fn test_since_filters_by_date() {
        let rows = (1..=10).map(|d| obs("colombo", d)).collect();
        let series = TimeSeries::new("colombo", rows).unwrap();
        let tail = series.since(NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert_eq!(tail.len(), 3);
    }
}
