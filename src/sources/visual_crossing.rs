use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

use crate::error::{ForecastError, Result};
use crate::models::{Location, Observation};
use crate::sources::WeatherSource;
use crate::utils::constants::DEFAULT_UNIT_GROUP;

/// Timeline API client: one request per (coordinates, day).
#[derive(Debug, Clone)]
pub struct VisualCrossingSource {
    base_url: String,
    api_key: String,
    unit_group: String,
    http: Client,
}

impl VisualCrossingSource {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            unit_group: DEFAULT_UNIT_GROUP.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_unit_group(mut self, unit_group: impl Into<String>) -> Self {
        self.unit_group = unit_group.into();
        self
    }

    pub fn day_url(&self, location: &Location, date: NaiveDate) -> String {
        let day = date.format("%Y-%m-%d");
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            location.coordinate_query(),
            day,
            day
        )
    }
}

#[async_trait]
impl WeatherSource for VisualCrossingSource {
    async fn fetch_day(&self, location: &Location, date: NaiveDate) -> Result<Observation> {
        let res = self
            .http
            .get(self.day_url(location, date))
            .query(&[
                ("unitGroup", self.unit_group.as_str()),
                ("include", "days"),
                ("key", self.api_key.as_str()),
                ("contentType", "json"),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ForecastError::UnexpectedStatus {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        parse_day_payload(&body, location, date)
    }
}

#[derive(Debug, Deserialize)]
struct TimelineResponse {
    #[serde(default)]
    days: Vec<TimelineDay>,
}

#[derive(Debug, Deserialize)]
struct TimelineDay {
    tempmax: Option<f64>,
    dew: Option<f64>,
    humidity: Option<f64>,
    solarradiation: Option<f64>,
}

/// Convert a timeline payload into an observation for `location` on `date`.
/// A missing or empty `days` array is an error.
pub fn parse_day_payload(body: &str, location: &Location, date: NaiveDate) -> Result<Observation> {
    let parsed: TimelineResponse = serde_json::from_str(body)?;
    let day = parsed.days.into_iter().next().ok_or(ForecastError::EmptyPayload)?;

    Ok(Observation {
        location: location.name.clone(),
        date,
        tempmax: day.tempmax,
        humidity: day.humidity,
        dew: day.dew,
        solarradiation: day.solarradiation,
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() <= MAX {
        body.to_string()
    } else {
        let truncated: String = body.chars().take(MAX).collect();
        format!("{}…", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colombo() -> Location {
        Location::new("colombo", 6.932, 79.846)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_day_url_uses_coordinates_and_iso_date() {
        let source = VisualCrossingSource::new("https://example.test/timeline/", "KEY");
        assert_eq!(
            source.day_url(&colombo(), date()),
            "https://example.test/timeline/6.932,79.846/2024-05-01/2024-05-01"
        );
    }

    #[test]
    fn test_parse_payload_tags_location_name() -> Result<()> {
        let body = r#"{"latitude":6.932,"days":[{"datetime":"2024-05-01","tempmax":31.4,
            "dew":24.2,"humidity":79.1,"solarradiation":null,"conditions":"Rain"}]}"#;
        let observation = parse_day_payload(body, &colombo(), date())?;

        assert_eq!(observation.location, "colombo");
        assert_eq!(observation.date, date());
        assert_eq!(observation.tempmax, Some(31.4));
        assert_eq!(observation.humidity, Some(79.1));
        assert_eq!(observation.solarradiation, None);
        Ok(())
    }

    #[test]
    fn test_empty_or_absent_days_is_an_error() {
        for body in [r#"{"days":[]}"#, r#"{"queryCost":1}"#] {
            let result = parse_day_payload(body, &colombo(), date());
            assert!(matches!(result, Err(ForecastError::EmptyPayload)));
        }
        assert!(matches!(
            parse_day_payload("<html>", &colombo(), date()),
            Err(ForecastError::Json(_))
        ));
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(500);
        assert_eq!(truncate_body(&long).chars().count(), 201);
        assert_eq!(truncate_body("short"), "short");
    }
}
