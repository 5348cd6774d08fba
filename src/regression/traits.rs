//! Regressor interface shared by all model artifacts.

use std::fmt::Debug;
use std::sync::Arc;

use crate::error::Result;
use crate::models::Target;

/// A trained model bound to one target and a fixed, ordered feature list.
///
/// Implementations are immutable after loading and may be shared across
/// threads; `predict` must be a pure function of its input.
pub trait Regressor: Send + Sync + Debug {
    /// The variable this model predicts.
    fn target(&self) -> Target;

    /// Required feature names, in the order `predict` expects them.
    fn feature_names(&self) -> &[String];

    /// Training-time location vocabulary, if the artifact recorded one.
    fn location_vocabulary(&self) -> Option<&[String]> {
        None
    }

    /// Predict from a row laid out per `feature_names`.
    fn predict(&self, features: &[f64]) -> Result<f64>;
}

/// Shared, read-only model handle.
pub type SharedRegressor = Arc<dyn Regressor>;
