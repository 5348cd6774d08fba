use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::error::{ForecastError, Result};
use crate::models::Target;
use crate::regression::{ModelArtifact, SharedRegressor};
use crate::utils::constants::MODEL_FILE_SUFFIX;

/// Exactly one loaded model per target, shared read-only.
#[derive(Debug, Clone)]
pub struct ModelSet {
    models: [SharedRegressor; 4],
}

impl ModelSet {
    /// Build from any collection of regressors covering every target once.
    pub fn new(regressors: Vec<SharedRegressor>) -> Result<Self> {
        let mut slots: [Option<SharedRegressor>; 4] = [None, None, None, None];

        for regressor in regressors {
            let target = regressor.target();
            if slots[target.index()].replace(regressor).is_some() {
                return Err(ForecastError::InvalidModel(format!(
                    "more than one model supplied for {}",
                    target
                )));
            }
        }

        let models = Target::ALL
            .iter()
            .map(|target| {
                slots[target.index()]
                    .take()
                    .ok_or_else(|| ForecastError::ModelUnavailable {
                        target: *target,
                        reason: "no model supplied".to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let models: [SharedRegressor; 4] = models
            .try_into()
            .map_err(|_| ForecastError::InvalidModel("model set is incomplete".to_string()))?;

        Ok(Self { models })
    }

    /// Load `{target}_model.json` for every target from `dir`.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let regressors = Target::ALL
            .iter()
            .map(|target| {
                let path = dir.join(format!("{}{}", target.column(), MODEL_FILE_SUFFIX));
                let artifact = ModelArtifact::load(&path, *target)?;
                info!(
                    target = %target,
                    features = artifact.feature_names.len(),
                    path = %path.display(),
                    "Loaded model"
                );
                Ok(Arc::new(artifact) as SharedRegressor)
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(regressors)
    }

    pub fn get(&self, target: Target) -> &SharedRegressor {
        &self.models[target.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Target, &SharedRegressor)> {
        Target::ALL.into_iter().map(move |t| (t, self.get(t)))
    }

    /// The first location vocabulary recorded by any model, in target order.
    pub fn location_vocabulary(&self) -> Option<Vec<String>> {
        self.models
            .iter()
            .find_map(|m| m.location_vocabulary().map(|v| v.to_vec()))
    }
}
