#![forbid(unsafe_code)]

//! Gradient-boosted tree ensemble read from a JSON artifact.
//!
//! The artifact lists every boosting round as one regression tree per
//! class. A row's margin for a class is `base_score` plus the leaf values
//! that class's trees reach; the distribution is the softmax of the
//! margins.
//!
//! ```json
//! {
//!   "feature_names": ["Elevation", "..."],
//!   "num_class": 7,
//!   "base_score": 0.5,
//!   "trees": [
//!     { "class": 0, "nodes": [
//!       { "feature": 0, "threshold": 2800.0, "left": 1, "right": 2 },
//!       { "value": 0.4 },
//!       { "value": -0.2 }
//!     ]}
//!   ]
//! }
//! ```

use crate::domain::FeatureVector;
use crate::error::{Error, ModelError, PredictionError};
use crate::prediction::Classifier;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One node of a regression tree. A node without a `feature` is a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<usize>,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub left: usize,
    #[serde(default)]
    pub right: usize,
    #[serde(default)]
    pub value: f64,
}

impl TreeNode {
    pub fn leaf(value: f64) -> Self {
        Self {
            feature: None,
            threshold: 0.0,
            left: 0,
            right: 0,
            value,
        }
    }

    pub fn split(feature: usize, threshold: f64, left: usize, right: usize) -> Self {
        Self {
            feature: Some(feature),
            threshold,
            left,
            right,
            value: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Tree {
    class: usize,
    nodes: Vec<TreeNode>,
}

impl Tree {
    /// Walk from the root to a leaf. Samples with `x < threshold` go left.
    fn leaf_value(&self, row: &[f64]) -> f64 {
        let mut ix = 0;
        loop {
            let node = &self.nodes[ix];
            match node.feature {
                None => return node.value,
                Some(feature) => {
                    ix = if row[feature] < node.threshold {
                        node.left
                    } else {
                        node.right
                    };
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    feature_names: Vec<String>,
    num_class: usize,
    #[serde(default)]
    base_score: f64,
    trees: Vec<Tree>,
}

impl TreeEnsemble {
    /// Build an ensemble from `(class, nodes)` trees.
    pub fn new(
        feature_names: Vec<String>,
        num_class: usize,
        base_score: f64,
        trees: Vec<(usize, Vec<TreeNode>)>,
    ) -> Result<Self, ModelError> {
        let ensemble = Self {
            feature_names,
            num_class,
            base_score,
            trees: trees
                .into_iter()
                .map(|(class, nodes)| Tree { class, nodes })
                .collect(),
        };
        ensemble.validate()?;
        Ok(ensemble)
    }

    /// Read and validate an artifact from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let ensemble = Self::read(path).map_err(|source| Error::ModelLoad {
            path: path.to_owned(),
            source,
        })?;
        info!(
            path = %path.display(),
            trees = ensemble.trees.len(),
            classes = ensemble.num_class,
            "classifier loaded"
        );
        Ok(ensemble)
    }

    fn read(path: &Path) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path)?;
        let ensemble: Self = serde_json::from_str(&text)?;
        ensemble.validate()?;
        Ok(ensemble)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Every link must point forward, which rules out cycles and keeps
    /// [`Tree::leaf_value`] terminating.
    fn validate(&self) -> Result<(), ModelError> {
        if self.num_class < 2 {
            return Err(ModelError::TooFewClasses(self.num_class));
        }
        let num_features = self.feature_names.len();
        for (tree_ix, tree) in self.trees.iter().enumerate() {
            if tree.class >= self.num_class {
                return Err(ModelError::ClassOutOfRange {
                    tree: tree_ix,
                    class: tree.class,
                    num_class: self.num_class,
                });
            }
            if tree.nodes.is_empty() {
                return Err(ModelError::EmptyTree(tree_ix));
            }
            for (node_ix, node) in tree.nodes.iter().enumerate() {
                let Some(feature) = node.feature else {
                    continue;
                };
                if feature >= num_features {
                    return Err(ModelError::FeatureOutOfRange {
                        tree: tree_ix,
                        node: node_ix,
                        feature,
                        num_features,
                    });
                }
                for child in [node.left, node.right] {
                    if child <= node_ix || child >= tree.nodes.len() {
                        return Err(ModelError::BadChild {
                            tree: tree_ix,
                            node: node_ix,
                            child,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn margins(&self, row: &FeatureVector) -> Result<Vec<f64>, PredictionError> {
        let values = row.as_slice();
        if values.len() != self.feature_names.len() {
            return Err(PredictionError::Classifier(format!(
                "row has {} features, model expects {}",
                values.len(),
                self.feature_names.len()
            )));
        }
        let mut margins = vec![self.base_score; self.num_class];
        for tree in &self.trees {
            margins[tree.class] += tree.leaf_value(values);
        }
        Ok(margins)
    }
}

fn softmax(margins: &[f64]) -> Vec<f64> {
    let max = margins.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = margins.iter().map(|m| (m - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest value; the lowest index wins ties.
fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (ix, v)| {
            if *v > best.1 { (ix, *v) } else { best }
        })
        .0
}

impl Classifier for TreeEnsemble {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn num_classes(&self) -> usize {
        self.num_class
    }

    fn predict(&self, rows: &[FeatureVector]) -> Result<Vec<usize>, PredictionError> {
        rows.iter()
            .map(|row| self.margins(row).map(|m| argmax(&m)))
            .collect()
    }

    fn predict_probabilities(
        &self,
        rows: &[FeatureVector],
    ) -> Result<Vec<Vec<f64>>, PredictionError> {
        rows.iter()
            .map(|row| self.margins(row).map(|m| softmax(&m)))
            .collect()
    }
}
