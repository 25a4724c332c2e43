//! Length-of-stay inference: fitted artifacts and the feature pipeline.
//!
//! The artifacts (one-hot encoder, robust scaler, regression model) are
//! fitted offline and loaded once at startup into an [`ArtifactStore`].
//! [`features`] turns one admission into the exact row layout the model was
//! trained on.

pub mod artifacts;
pub mod encoder;
pub mod features;
pub mod model;
pub mod scaler;

use std::path::PathBuf;

pub use artifacts::ArtifactStore;
pub use encoder::OneHotEncoder;
pub use features::{FeatureFrame, MODEL_COLUMNS};
pub use model::{Regressor, RegressionModel};
pub use scaler::RobustScaler;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Artifact not found: {0}")]
    ArtifactNotFound(PathBuf),

    #[error("Failed to load artifact {path}: {reason}")]
    ArtifactLoad { path: PathBuf, reason: String },

    #[error("Invalid artifact {artifact}: {reason}")]
    InvalidArtifact { artifact: &'static str, reason: String },

    #[error("Unknown category '{value}' for feature '{feature}'")]
    UnknownCategory { feature: String, value: String },

    #[error("Column mismatch: expected {expected:?}, got {actual:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Model expects {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("Model produced a non-finite prediction: {0}")]
    NonFinitePrediction(f64),
}
