//! Regression models evaluated on one feature row.
//!
//! Two model families can be loaded from `model.json`:
//! - `gradient_boosted_trees` — an additive ensemble of binary trees
//! - `linear` — intercept plus weighted sum
//!
//! Both carry the feature names they were fitted on; the artifact store
//! checks them against the pipeline's column contract at load time.

use ndarray::ArrayView1;
use serde::Deserialize;

use super::InferenceError;

/// Anything that maps one feature row to one raw prediction.
pub trait Regressor: Send + Sync {
    /// Feature names in the order the model consumes them.
    fn feature_names(&self) -> &[String];

    /// Raw model output for one row.
    fn predict_row(&self, row: ArrayView1<'_, f64>) -> Result<f64, InferenceError>;
}

// ═══════════════════════════════════════════════════════════
// Tree ensemble
// ═══════════════════════════════════════════════════════════

/// A node of a regression tree. Nodes are addressed by their index in
/// [`Tree::nodes`]; children always come after their parent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        /// Index into the feature row.
        split: usize,
        threshold: f64,
        /// Taken when `x < threshold`.
        yes: usize,
        no: usize,
        /// Taken when `x` is NaN.
        missing: usize,
    },
    Leaf {
        leaf: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("empty tree".into());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split { split, threshold, yes, no, missing } => {
                    if *split >= n_features {
                        return Err(format!("node {i} splits on feature {split}"));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {i} has a NaN threshold"));
                    }
                    for child in [yes, no, missing] {
                        if *child <= i || *child >= self.nodes.len() {
                            return Err(format!("node {i} points at invalid child {child}"));
                        }
                    }
                }
                Node::Leaf { leaf } => {
                    if !leaf.is_finite() {
                        return Err(format!("node {i} has a non-finite leaf"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf. Terminates because validated children
    /// always have a larger index than their parent.
    fn leaf_value(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { leaf } => return *leaf,
                Node::Split { split, threshold, yes, no, missing } => {
                    let x = row[*split];
                    idx = if x.is_nan() {
                        *missing
                    } else if x < *threshold {
                        *yes
                    } else {
                        *no
                    };
                }
            }
        }
    }
}

/// Gradient-boosted regression trees: `base_score + Σ leaf(tree, row)`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TreeEnsemble {
    pub feature_names: Vec<String>,
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

impl TreeEnsemble {
    pub fn validate(&self) -> Result<(), InferenceError> {
        if !self.base_score.is_finite() {
            return Err(invalid_model("non-finite base_score".into()));
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.validate(self.feature_names.len())
                .map_err(|reason| invalid_model(format!("tree {t}: {reason}")))?;
        }
        Ok(())
    }
}

impl Regressor for TreeEnsemble {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> Result<f64, InferenceError> {
        check_width(self.feature_names.len(), row.len())?;
        Ok(self.base_score + self.trees.iter().map(|t| t.leaf_value(row)).sum::<f64>())
    }
}

// ═══════════════════════════════════════════════════════════
// Linear model
// ═══════════════════════════════════════════════════════════

/// `intercept + coefficients · row`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinearModel {
    pub feature_names: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    pub fn validate(&self) -> Result<(), InferenceError> {
        if self.coefficients.len() != self.feature_names.len() {
            return Err(invalid_model(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                self.feature_names.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(invalid_model("non-finite weights".into()));
        }
        Ok(())
    }
}

impl Regressor for LinearModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> Result<f64, InferenceError> {
        check_width(self.coefficients.len(), row.len())?;
        let weights = ArrayView1::from(self.coefficients.as_slice());
        Ok(self.intercept + weights.dot(&row))
    }
}

// ═══════════════════════════════════════════════════════════
// Model artifact
// ═══════════════════════════════════════════════════════════

/// The model artifact as stored on disk, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressionModel {
    GradientBoostedTrees(TreeEnsemble),
    Linear(LinearModel),
}

impl RegressionModel {
    pub fn validate(&self) -> Result<(), InferenceError> {
        match self {
            Self::GradientBoostedTrees(m) => m.validate(),
            Self::Linear(m) => m.validate(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::GradientBoostedTrees(_) => "gradient_boosted_trees",
            Self::Linear(_) => "linear",
        }
    }

    fn as_regressor(&self) -> &dyn Regressor {
        match self {
            Self::GradientBoostedTrees(m) => m,
            Self::Linear(m) => m,
        }
    }
}

impl Regressor for RegressionModel {
    fn feature_names(&self) -> &[String] {
        self.as_regressor().feature_names()
    }

    fn predict_row(&self, row: ArrayView1<'_, f64>) -> Result<f64, InferenceError> {
        self.as_regressor().predict_row(row)
    }
}

fn check_width(expected: usize, actual: usize) -> Result<(), InferenceError> {
    if expected != actual {
        return Err(InferenceError::FeatureCount { expected, actual });
    }
    Ok(())
}

fn invalid_model(reason: String) -> InferenceError {
    InferenceError::InvalidArtifact {
        artifact: "model",
        reason,
    }
}
