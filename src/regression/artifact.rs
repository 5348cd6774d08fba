use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{ForecastError, Result};
use crate::models::Target;
use crate::regression::{LinearModel, Regressor, TreeEnsemble};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelBody {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
}

/// A model artifact as stored on disk (`{target}_model.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub target: Target,
    pub feature_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<String>>,
    pub model: ModelBody,
}

impl ModelArtifact {
    pub fn new(target: Target, feature_names: Vec<String>, model: ModelBody) -> Result<Self> {
        let artifact = Self {
            target,
            feature_names,
            locations: None,
            model,
        };
        artifact.check()?;
        Ok(artifact)
    }

    pub fn with_locations(mut self, locations: Vec<String>) -> Self {
        self.locations = Some(locations);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let artifact: ModelArtifact = serde_json::from_str(json)?;
        artifact.check()?;
        Ok(artifact)
    }

    /// Load and validate an artifact, expecting it to predict `target`.
    pub fn load(path: &Path, target: Target) -> Result<Self> {
        let unavailable = |reason: String| ForecastError::ModelUnavailable { target, reason };

        let json = std::fs::read_to_string(path)
            .map_err(|e| unavailable(format!("{}: {}", path.display(), e)))?;
        let artifact =
            Self::from_json(&json).map_err(|e| unavailable(format!("{}: {}", path.display(), e)))?;

        if artifact.target != target {
            return Err(unavailable(format!(
                "{} holds a model for {}",
                path.display(),
                artifact.target
            )));
        }

        Ok(artifact)
    }

    fn check(&self) -> Result<()> {
        if self.feature_names.is_empty() {
            return Err(ForecastError::InvalidModel(format!(
                "{} model declares no features",
                self.target
            )));
        }

        let mut seen = HashSet::new();
        if let Some(duplicate) = self.feature_names.iter().find(|f| !seen.insert(f.as_str())) {
            return Err(ForecastError::InvalidModel(format!(
                "{} model declares feature '{}' twice",
                self.target, duplicate
            )));
        }

        match &self.model {
            ModelBody::Linear(linear) => linear.check_arity(self.feature_names.len()),
            ModelBody::TreeEnsemble(ensemble) => ensemble.check(self.feature_names.len()),
        }
    }
}

impl Regressor for ModelArtifact {
    fn target(&self) -> Target {
        self.target
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn location_vocabulary(&self) -> Option<&[String]> {
        self.locations.as_deref()
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.feature_names.len() {
            return Err(ForecastError::InvalidFormat(format!(
                "{} model expects {} features, got {}",
                self.target,
                self.feature_names.len(),
                features.len()
            )));
        }

        Ok(match &self.model {
            ModelBody::Linear(linear) => linear.predict(features),
            ModelBody::TreeEnsemble(ensemble) => ensemble.predict(features),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LINEAR_JSON: &str = r#"{
        "target": "humidity",
        "feature_names": ["humidity_lag1", "hum_roll3"],
        "locations": ["colombo", "padukka"],
        "model": {"kind": "linear", "intercept": 1.0, "coefficients": [0.5, 0.25]}
    }"#;

    #[test]
    fn test_parse_linear_artifact() -> Result<()> {
        let artifact = ModelArtifact::from_json(LINEAR_JSON)?;
        assert_eq!(artifact.target(), Target::Humidity);
        assert_eq!(artifact.feature_names(), ["humidity_lag1", "hum_roll3"]);
        assert_eq!(artifact.location_vocabulary().map(|l| l.len()), Some(2));
        assert_eq!(artifact.predict(&[80.0, 40.0])?, 1.0 + 40.0 + 10.0);
        assert!(artifact.predict(&[80.0]).is_err());
        Ok(())
    }

    #[test]
    fn test_parse_tree_artifact() -> Result<()> {
        let json = r#"{
            "target": "dew",
            "feature_names": ["dew_lag1"],
            "model": {"kind": "tree_ensemble", "base_score": 20.0, "trees": [
                {"nodes": [{"feature": 0, "threshold": 24.0, "left": 1, "right": 2},
                           {"value": 1.0}, {"value": 3.0}]}
            ]}
        }"#;
        let artifact = ModelArtifact::from_json(json)?;
        assert_eq!(artifact.predict(&[23.0])?, 21.0);
        assert_eq!(artifact.predict(&[25.0])?, 23.0);
        Ok(())
    }

    #[test]
    fn test_rejects_bad_artifacts() {
        let duplicate = r#"{"target":"dew","feature_names":["a","a"],
            "model":{"kind":"linear","intercept":0.0,"coefficients":[1.0,1.0]}}"#;
        assert!(ModelArtifact::from_json(duplicate).is_err());

        let arity = r#"{"target":"dew","feature_names":["a"],
            "model":{"kind":"linear","intercept":0.0,"coefficients":[1.0,1.0]}}"#;
        assert!(ModelArtifact::from_json(arity).is_err());
    }

    #[test]
    fn test_load_reports_model_unavailable() -> Result<()> {
        let dir = TempDir::new()?;
        let missing = ModelArtifact::load(&dir.path().join("nope.json"), Target::Dew);
        assert!(matches!(
            missing,
            Err(ForecastError::ModelUnavailable { target: Target::Dew, .. })
        ));

        let path = dir.path().join("humidity_model.json");
        std::fs::write(&path, LINEAR_JSON)?;
        let wrong_target = ModelArtifact::load(&path, Target::TempMax);
        assert!(matches!(
            wrong_target,
            Err(ForecastError::ModelUnavailable { target: Target::TempMax, .. })
        ));
        assert!(ModelArtifact::load(&path, Target::Humidity).is_ok());
        Ok(())
    }
}
