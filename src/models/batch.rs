use serde::Serialize;
use std::fmt::Display;

use crate::error::ForecastError;

/// A failed unit of work, tagged with the key of the unit that failed.
#[derive(Debug)]
pub struct UnitFailure<K> {
    pub key: K,
    pub error: ForecastError,
}

/// Outcome of a batch where each unit succeeds or fails on its own.
#[derive(Debug)]
pub struct BatchResult<K, T> {
    pub successes: Vec<T>,
    pub failures: Vec<UnitFailure<K>>,
}

impl<K, T> BatchResult<K, T> {
    pub fn new() -> Self {
        Self {
            successes: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn record(&mut self, key: K, outcome: Result<T, ForecastError>) {
        match outcome {
            Ok(value) => self.successes.push(value),
            Err(error) => self.failures.push(UnitFailure { key, error }),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.successes.len() + self.failures.len()
    }
}

impl<K, T> Default for BatchResult<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> FromIterator<(K, Result<T, ForecastError>)> for BatchResult<K, T> {
    fn from_iter<I: IntoIterator<Item = (K, Result<T, ForecastError>)>>(iter: I) -> Self {
        let mut batch = Self::new();
        for (key, outcome) in iter {
            batch.record(key, outcome);
        }
        batch
    }
}

/// Serializable diagnostic for a failed unit.
#[derive(Debug, Clone, Serialize)]
pub struct FailureDiagnostic {
    pub unit: String,
    pub error: String,
}

impl<K: Display> From<&UnitFailure<K>> for FailureDiagnostic {
    fn from(failure: &UnitFailure<K>) -> Self {
        Self {
            unit: failure.key.to_string(),
            error: failure.error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_collects_both_outcomes() {
        let batch: BatchResult<&str, u32> = vec![
            ("a", Ok(1)),
            ("b", Err(ForecastError::EmptyPayload)),
            ("c", Ok(3)),
        ]
        .into_iter()
        .collect();

        assert_eq!(batch.successes, vec![1, 3]);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].key, "b");
        assert_eq!(batch.attempted(), 3);
        assert!(!batch.is_complete());

        let diagnostic = FailureDiagnostic::from(&batch.failures[0]);
        assert_eq!(diagnostic.unit, "b");
        assert!(diagnostic.error.contains("no daily data"));
    }
}
