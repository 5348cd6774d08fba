use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::analyzers::RiskLevel;
use crate::models::ForecastRecord;

/// Hottest forecast day for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPeak {
    pub location: String,
    pub date: NaiveDate,
    pub heat_index: i32,
    pub risk_level: RiskLevel,
}

#[derive(Debug)]
pub struct ForecastStatistics {
    pub total_records: usize,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub peaks: Vec<LocationPeak>,
    pub risk_counts: BTreeMap<RiskLevel, usize>,
}

impl ForecastStatistics {
    /// Share of forecast days at or above `level`, in percent.
    pub fn percentage_at_or_above(&self, level: RiskLevel) -> f64 {
        if self.total_records == 0 {
            return 0.0;
        }
        let count: usize = self.risk_counts.range(level..).map(|(_, n)| n).sum();
        (count as f64 / self.total_records as f64) * 100.0
    }

    pub fn summary(&self) -> String {
        let range = match self.date_range {
            Some((start, end)) => format!("{} to {}", start, end),
            None => "no forecast days".to_string(),
        };

        let mut summary = format!(
            "Forecast: {} locations, {} records\nDate Range: {}\nDays at Danger or above: {:.1}%",
            self.peaks.len(),
            self.total_records,
            range,
            self.percentage_at_or_above(RiskLevel::Danger)
        );

        if !self.risk_counts.is_empty() {
            summary.push_str("\n\nRisk Levels:");
            for (level, count) in &self.risk_counts {
                summary.push_str(&format!("\n- {}: {}", level, count));
            }
        }

        if !self.peaks.is_empty() {
            summary.push_str("\n\nPeak Heat Index:");
            for peak in &self.peaks {
                summary.push_str(&format!(
                    "\n- {}: {}°C on {} ({})",
                    peak.location, peak.heat_index, peak.date, peak.risk_level
                ));
            }
        }

        summary
    }
}

pub struct ForecastAnalyzer;

impl ForecastAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, records: &[ForecastRecord]) -> ForecastStatistics {
        let mut risk_counts = BTreeMap::new();
        let mut peaks: BTreeMap<&str, LocationPeak> = BTreeMap::new();
        let mut date_range: Option<(NaiveDate, NaiveDate)> = None;

        for record in records {
            *risk_counts.entry(record.risk_level).or_insert(0) += 1;

            date_range = Some(match date_range {
                Some((start, end)) => (start.min(record.date), end.max(record.date)),
                None => (record.date, record.date),
            });

            // Earliest day wins a tie.
            let hotter = peaks
                .get(record.location.as_str())
                .map_or(true, |peak| record.heat_index > peak.heat_index);
            if hotter {
                peaks.insert(
                    &record.location,
                    LocationPeak {
                        location: record.location.clone(),
                        date: record.date,
                        heat_index: record.heat_index,
                        risk_level: record.risk_level,
                    },
                );
            }
        }

        ForecastStatistics {
            total_records: records.len(),
            date_range,
            peaks: peaks.into_values().collect(),
            risk_counts,
        }
    }
}

impl Default for ForecastAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
