use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// One node of a binary regression tree, addressed by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Children must point forward, which rules out cycles.
    fn check(&self, feature_count: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(ForecastError::InvalidModel("tree has no nodes".to_string()));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= feature_count {
                    return Err(ForecastError::InvalidModel(format!(
                        "node {} splits on feature {} but only {} features exist",
                        index, feature, feature_count
                    )));
                }
                for child in [left, right] {
                    if *child <= index || *child >= self.nodes.len() {
                        return Err(ForecastError::InvalidModel(format!(
                            "node {} has invalid child index {}",
                            index, child
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, features: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Additive ensemble of regression trees (gradient-boosted style).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<RegressionTree>,
}

impl TreeEnsemble {
    pub fn check(&self, feature_count: usize) -> Result<()> {
        if self.trees.is_empty() {
            return Err(ForecastError::InvalidModel("ensemble has no trees".to_string()));
        }
        self.trees.iter().try_for_each(|tree| tree.check(feature_count))
    }

    pub fn predict(&self, features: &[f64]) -> f64 {
        self.trees
            .iter()
            .fold(self.base_score, |acc, tree| acc + tree.evaluate(features))
    }
}
