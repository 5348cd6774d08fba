use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;

use crate::error::Result;
use crate::models::{Location, Observation};

pub mod visual_crossing;

pub use visual_crossing::VisualCrossingSource;

/// External provider of observed daily weather.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// Fetch one day for one location. The returned observation is tagged
    /// with `location.name`, never its coordinates.
    async fn fetch_day(&self, location: &Location, date: NaiveDate) -> Result<Observation>;
}
