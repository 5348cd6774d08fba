use serde::{Deserialize, Serialize};
use validator::Validate;

/// A named forecast location. Observations are keyed by `name`; the
/// coordinates are only used to query the external source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Location {
    #[validate(length(min = 1))]
    pub name: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
        }
    }

    /// `lat,lon` pair used as the query key by the weather source.
    pub fn coordinate_query(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}
