use chrono::{Duration, NaiveDate};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::error::{ForecastError, Result};
use crate::models::{BatchResult, Location, Observation, ObservationStore, UnitFailure};
use crate::sources::WeatherSource;
use crate::utils::progress::ProgressReporter;

/// One (date, location) fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FetchCell {
    pub date: NaiveDate,
    pub location: String,
}

impl fmt::Display for FetchCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.location, self.date)
    }
}

/// Outcome of one synchronization run.
#[derive(Debug)]
pub struct SyncReport {
    pub missing_dates: Vec<NaiveDate>,
    pub attempted: usize,
    pub added: usize,
    pub failures: Vec<UnitFailure<FetchCell>>,
}

impl SyncReport {
    fn up_to_date() -> Self {
        Self {
            missing_dates: Vec::new(),
            attempted: 0,
            added: 0,
            failures: Vec::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.missing_dates.is_empty()
    }

    pub fn summary(&self) -> String {
        if self.is_noop() {
            return "Observation store already up to date".to_string();
        }

        let mut summary = format!(
            "Backfilled {} → {}: {} of {} cells fetched",
            self.missing_dates[0],
            self.missing_dates[self.missing_dates.len() - 1],
            self.added,
            self.attempted
        );
        if !self.failures.is_empty() {
            summary.push_str(&format!("\nSkipped {} cells:", self.failures.len()));
            for failure in self.failures.iter().take(10) {
                summary.push_str(&format!("\n  • {}: {}", failure.key, failure.error));
            }
        }
        summary
    }
}

/// Inclusive range `[last_date + 1, today - 1]`, empty when already current.
pub fn missing_dates(last_date: NaiveDate, today: NaiveDate) -> Vec<NaiveDate> {
    let start = last_date + Duration::days(1);
    let end = today - Duration::days(1);
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Backfills the observation store from an external source.
pub struct GapSynchronizer {
    source: Arc<dyn WeatherSource>,
    locations: Vec<Location>,
    max_workers: usize,
}

impl GapSynchronizer {
    pub fn new(source: Arc<dyn WeatherSource>, locations: Vec<Location>) -> Self {
        Self {
            source,
            locations,
            max_workers: 1,
        }
    }

    /// Number of fetches allowed in flight at once.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    /// Load, backfill, and rewrite the store at `path`. The file is only
    /// rewritten when at least one row was fetched.
    pub async fn synchronize_file(
        &self,
        path: &Path,
        today: NaiveDate,
        progress: Option<&ProgressReporter>,
    ) -> Result<SyncReport> {
        let mut store = ObservationStore::load(path)?;
        let report = self.synchronize(&mut store, today, progress).await?;

        if report.added > 0 {
            store.persist(path)?;
            info!(path = %path.display(), rows = store.len(), "Rewrote observation store");
        }

        Ok(report)
    }

    /// Backfill `store` in memory.
    pub async fn synchronize(
        &self,
        store: &mut ObservationStore,
        today: NaiveDate,
        progress: Option<&ProgressReporter>,
    ) -> Result<SyncReport> {
        let last_date = store.last_date().ok_or(ForecastError::EmptyStore)?;
        let dates = missing_dates(last_date, today);

        if dates.is_empty() {
            info!(%last_date, "Observation store already up to date");
            return Ok(SyncReport::up_to_date());
        }

        info!(
            from = %dates[0],
            to = %dates[dates.len() - 1],
            locations = self.locations.len(),
            "Fetching missing days"
        );

        let batch = self.fetch_all(&dates, progress).await?;
        let attempted = batch.attempted();
        let added = batch.successes.len();

        if added > 0 {
            store.append(batch.successes);
        }

        Ok(SyncReport {
            missing_dates: dates,
            attempted,
            added,
            failures: batch.failures,
        })
    }

    async fn fetch_all(
        &self,
        dates: &[NaiveDate],
        progress: Option<&ProgressReporter>,
    ) -> Result<BatchResult<FetchCell, Observation>> {
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks = JoinSet::new();

        for date in dates {
            for location in &self.locations {
                let source = Arc::clone(&self.source);
                let semaphore = Arc::clone(&semaphore);
                let location = location.clone();
                let date = *date;

                tasks.spawn(async move {
                    let cell = FetchCell {
                        date,
                        location: location.name.clone(),
                    };
                    let outcome = match semaphore.acquire_owned().await {
                        Ok(_permit) => source.fetch_day(&location, date).await,
                        Err(e) => Err(ForecastError::MissingData(e.to_string())),
                    };
                    (cell, outcome)
                });
            }
        }

        if let Some(p) = progress {
            p.set_length((dates.len() * self.locations.len()) as u64);
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            let (cell, outcome) = joined?;
            if let Err(ref error) = outcome {
                warn!(location = %cell.location, date = %cell.date, %error, "Skipping failed fetch");
            }
            if let Some(p) = progress {
                p.increment(1);
            }
            outcomes.push((cell, outcome));
        }

        outcomes.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(outcomes.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::DEFAULT_LOCATIONS;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    #[derive(Debug, Default)]
    struct ScriptedSource {
        failing: HashSet<(String, NaiveDate)>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn failing(cells: &[(&str, NaiveDate)]) -> Self {
            Self {
                failing: cells.iter().map(|(l, d)| (l.to_string(), *d)).collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WeatherSource for ScriptedSource {
        async fn fetch_day(&self, location: &Location, date: NaiveDate) -> Result<Observation> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.contains(&(location.name.clone(), date)) {
                return Err(ForecastError::EmptyPayload);
            }
            Ok(Observation::with_values(&location.name, date, 31.0, 78.0, 24.0, 205.0))
        }
    }

    fn ymd(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn locations() -> Vec<Location> {
        DEFAULT_LOCATIONS
            .iter()
            .map(|(name, lat, lon)| Location::new(*name, *lat, *lon))
            .collect()
    }

    fn seeded_store(last: NaiveDate) -> ObservationStore {
        ObservationStore::new(
            locations()
                .iter()
                .map(|l| Observation::with_values(&l.name, last, 30.0, 80.0, 24.0, 190.0))
                .collect(),
        )
    }

    #[test]
    fn test_missing_dates_range() {
        assert_eq!(
            missing_dates(ymd(5, 1), ymd(5, 5)),
            vec![ymd(5, 2), ymd(5, 3), ymd(5, 4)]
        );
        // Current through yesterday.
        assert!(missing_dates(ymd(5, 4), ymd(5, 5)).is_empty());
        // Store ahead of today.
        assert!(missing_dates(ymd(5, 9), ymd(5, 5)).is_empty());
        // Exactly one missing day.
        assert_eq!(missing_dates(ymd(5, 3), ymd(5, 5)), vec![ymd(5, 4)]);
    }

    #[tokio::test]
    async fn test_current_store_makes_no_calls() -> Result<()> {
        let source = Arc::new(ScriptedSource::default());
        let sync = GapSynchronizer::new(source.clone(), locations());

        let dir = TempDir::new()?;
        let path = dir.path().join("store.csv");
        let original = "location,datetime,tempmax,humidity,dew,solarradiation\n\
                        colombo,04/05/2024,30.10,80,24,190\n";
        std::fs::write(&path, original)?;

        let report = sync.synchronize_file(&path, ymd(5, 5), None).await?;

        assert!(report.is_noop());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(std::fs::read_to_string(&path)?, original);
        Ok(())
    }

    #[tokio::test]
    async fn test_partial_failures_are_isolated() -> Result<()> {
        let failing = [("colombo", ymd(5, 2)), ("padukka", ymd(5, 4)), ("kesbawa", ymd(5, 4))];
        let source = Arc::new(ScriptedSource::failing(&failing));
        let sync = GapSynchronizer::new(source.clone(), locations()).with_max_workers(4);

        let mut store = seeded_store(ymd(5, 1));
        let report = sync.synchronize(&mut store, ymd(5, 5), None).await?;

        assert_eq!(source.calls.load(Ordering::SeqCst), 39);
        assert_eq!(report.attempted, 39);
        assert_eq!(report.added, 36);
        assert_eq!(report.failures.len(), 3);
        assert_eq!(store.len(), 13 + 36);

        for (location, date) in failing {
            assert!(!store
                .observations()
                .iter()
                .any(|o| o.location == location && o.date == date));
        }

        // Failures are reported in (date, location) order.
        assert_eq!(report.failures[0].key.location, "colombo");
        assert_eq!(report.failures[1].key.location, "kesbawa");
        assert_eq!(report.failures[2].key.location, "padukka");

        // Fetched rows carry the location name and keep the store ordered.
        let colombo = store.series("colombo")?;
        let dates: Vec<NaiveDate> = colombo.observations().iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![ymd(5, 1), ymd(5, 3), ymd(5, 4)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_file_rewritten_with_fetched_rows() -> Result<()> {
        let source = Arc::new(ScriptedSource::default());
        let colombo = vec![Location::new("colombo", 6.932, 79.846)];
        let sync = GapSynchronizer::new(source, colombo);

        let dir = TempDir::new()?;
        let path = dir.path().join("store.csv");
        std::fs::write(
            &path,
            "location,datetime,tempmax,humidity,dew,solarradiation\n\
             colombo,01/05/2024,30.1,80,24,190\n\
             colombo,garbage,30.1,80,24,190\n",
        )?;

        let report = sync.synchronize_file(&path, ymd(5, 4), None).await?;
        assert_eq!(report.added, 2);

        let reloaded = ObservationStore::load(&path)?;
        assert_eq!(reloaded.len(), 3);
        assert_eq!(reloaded.last_date(), Some(ymd(5, 3)));
        let text = std::fs::read_to_string(&path)?;
        assert!(text.contains("colombo,2024-05-01,"));
        assert!(!text.contains("garbage"));
        Ok(())
    }

    #[tokio::test]
    async fn test_all_failures_leave_file_untouched() -> Result<()> {
        let colombo = vec![Location::new("colombo", 6.932, 79.846)];
        let source = Arc::new(ScriptedSource::failing(&[
            ("colombo", ymd(5, 2)),
            ("colombo", ymd(5, 3)),
        ]));
        let sync = GapSynchronizer::new(source, colombo);

        let dir = TempDir::new()?;
        let path = dir.path().join("store.csv");
        let original = "location,datetime,tempmax,humidity,dew,solarradiation\n\
                        colombo,01/05/2024,30.1,80,24,190\n";
        std::fs::write(&path, original)?;

        let report = sync.synchronize_file(&path, ymd(5, 4), None).await?;
        assert_eq!(report.added, 0);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(std::fs::read_to_string(&path)?, original);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_store_is_an_error() {
        let sync = GapSynchronizer::new(Arc::new(ScriptedSource::default()), locations());
        let mut store = ObservationStore::default();
        let result = sync.synchronize(&mut store, ymd(5, 5), None).await;
        assert!(matches!(result, Err(ForecastError::EmptyStore)));
    }

    #[test]
    fn test_report_summary() {
        let report = SyncReport {
            missing_dates: vec![ymd(5, 2), ymd(5, 3)],
            attempted: 4,
            added: 3,
            failures: vec![UnitFailure {
                key: FetchCell {
                    date: ymd(5, 3),
                    location: "colombo".to_string(),
                },
                error: ForecastError::EmptyPayload,
            }],
        };
        let summary = report.summary();
        assert!(summary.contains("3 of 4 cells fetched"));
        assert!(summary.contains("colombo on 2024-05-03"));
        assert!(SyncReport::up_to_date().summary().contains("up to date"));
    }
}
