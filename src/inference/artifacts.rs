//! Fitted artifacts, loaded once at startup.
//!
//! The store is immutable after [`ArtifactStore::load`] and is shared across
//! request handlers behind an `Arc`. Any load or validation failure is fatal:
//! the service must not start without a usable model.

use std::path::{Path, PathBuf};

use ndarray::ArrayView1;
use serde::de::DeserializeOwned;

use super::features::{CATEGORICAL_FEATURES, MODEL_COLUMNS, SCALED_MEASUREMENTS};
use super::{InferenceError, OneHotEncoder, RegressionModel, Regressor, RobustScaler};

pub const ENCODER_FILE: &str = "onehot_encoder.json";
pub const SCALER_FILE: &str = "robust_scaler.json";
pub const MODEL_FILE: &str = "model.json";

#[derive(Debug)]
pub struct ArtifactStore {
    encoder: OneHotEncoder,
    scaler: RobustScaler,
    model: RegressionModel,
}

impl ArtifactStore {
    /// Load and validate the three artifacts from `dir`.
    pub fn load(dir: &Path) -> Result<Self, InferenceError> {
        let encoder: OneHotEncoder = read_artifact(&dir.join(ENCODER_FILE))?;
        let scaler: RobustScaler = read_artifact(&dir.join(SCALER_FILE))?;
        let model: RegressionModel = read_artifact(&dir.join(MODEL_FILE))?;

        let store = Self::new(encoder, scaler, model)?;
        tracing::info!(
            dir = %dir.display(),
            model = store.model.kind(),
            features = store.model_columns().len(),
            "Artifacts loaded"
        );
        Ok(store)
    }

    /// Assemble a store from already-parsed artifacts, checking that they
    /// agree with the feature pipeline's column contract.
    pub fn new(
        encoder: OneHotEncoder,
        scaler: RobustScaler,
        model: RegressionModel,
    ) -> Result<Self, InferenceError> {
        encoder.validate()?;
        scaler.validate()?;
        model.validate()?;

        let encoder_inputs: Vec<&str> = encoder.features.iter().map(|f| f.name.as_str()).collect();
        if encoder_inputs != CATEGORICAL_FEATURES {
            return Err(contract_violation(
                "onehot_encoder",
                format!("fitted on {encoder_inputs:?}, expected {CATEGORICAL_FEATURES:?}"),
            ));
        }

        let encoded = encoder.feature_names_out();
        if let Some(missing) = MODEL_COLUMNS
            .iter()
            .filter(|c| c.starts_with("rcount_"))
            .find(|c| !encoded.iter().any(|e| e == *c))
        {
            return Err(contract_violation(
                "onehot_encoder",
                format!("does not produce column '{missing}'"),
            ));
        }

        if scaler.features != SCALED_MEASUREMENTS {
            return Err(contract_violation(
                "robust_scaler",
                format!("fitted on {:?}, expected {SCALED_MEASUREMENTS:?}", scaler.features),
            ));
        }

        if model.feature_names() != MODEL_COLUMNS {
            return Err(contract_violation(
                "model",
                format!(
                    "feature names {:?} do not match the pipeline column order",
                    model.feature_names()
                ),
            ));
        }

        Ok(Self {
            encoder,
            scaler,
            model,
        })
    }

    pub fn encoder(&self) -> &OneHotEncoder {
        &self.encoder
    }

    pub fn scaler(&self) -> &RobustScaler {
        &self.scaler
    }

    pub fn model_kind(&self) -> &'static str {
        self.model.kind()
    }

    /// Column names the model consumes, in order.
    pub fn model_columns(&self) -> &[String] {
        self.model.feature_names()
    }

    /// Raw model output for one feature row.
    pub fn predict(&self, row: ArrayView1<'_, f64>) -> Result<f64, InferenceError> {
        self.model.predict_row(row)
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, InferenceError> {
    if !path.exists() {
        return Err(InferenceError::ArtifactNotFound(path.to_path_buf()));
    }
    let load_error = |reason: String| InferenceError::ArtifactLoad {
        path: PathBuf::from(path),
        reason,
    };
    let raw = std::fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| load_error(e.to_string()))
}

fn contract_violation(artifact: &'static str, reason: String) -> InferenceError {
    InferenceError::InvalidArtifact { artifact, reason }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn demo_artifacts_dir() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/artifacts")
    }

    /// The bundled demo artifacts.
    pub(crate) fn demo_store() -> ArtifactStore {
        ArtifactStore::load(&demo_artifacts_dir()).unwrap()
    }

    fn copy_demo_to(dir: &Path) {
        for file in [ENCODER_FILE, SCALER_FILE, MODEL_FILE] {
            std::fs::copy(demo_artifacts_dir().join(file), dir.join(file)).unwrap();
        }
    }

    #[test]
    fn demo_artifacts_load() {
        let store = demo_store();
        assert_eq!(store.model_kind(), "gradient_boosted_trees");
        assert_eq!(store.model_columns(), MODEL_COLUMNS.map(String::from));
    }

    #[test]
    fn missing_model_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        copy_demo_to(tmp.path());
        std::fs::remove_file(tmp.path().join(MODEL_FILE)).unwrap();

        let err = ArtifactStore::load(tmp.path()).unwrap_err();
        assert!(matches!(err, InferenceError::ArtifactNotFound(p) if p.ends_with(MODEL_FILE)));
    }

    #[test]
    fn corrupt_scaler_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        copy_demo_to(tmp.path());
        std::fs::write(tmp.path().join(SCALER_FILE), "{ not json").unwrap();

        let err = ArtifactStore::load(tmp.path()).unwrap_err();
        assert!(matches!(err, InferenceError::ArtifactLoad { .. }));
    }

    #[test]
    fn model_with_reordered_columns_is_rejected() {
        let store = demo_store();
        let mut model: RegressionModel = read_artifact(&demo_artifacts_dir().join(MODEL_FILE)).unwrap();
        if let RegressionModel::GradientBoostedTrees(ref mut trees) = model {
            trees.feature_names.swap(10, 11);
        }
        let err = ArtifactStore::new(store.encoder.clone(), store.scaler.clone(), model).unwrap_err();
        assert!(matches!(err, InferenceError::InvalidArtifact { artifact: "model", .. }));
    }

    #[test]
    fn encoder_without_top_bucket_is_rejected() {
        let store = demo_store();
        let mut encoder = store.encoder.clone();
        encoder.features[1].categories.retain(|c| c != "5+");
        let err = ArtifactStore::new(encoder, store.scaler.clone(), store.model.clone()).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::InvalidArtifact { artifact: "onehot_encoder", .. }
        ));
    }

    #[test]
    fn scaler_fitted_on_other_columns_is_rejected() {
        let store = demo_store();
        let mut scaler = store.scaler.clone();
        scaler.features.swap(0, 1);
        let err = ArtifactStore::new(store.encoder.clone(), scaler, store.model.clone()).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::InvalidArtifact { artifact: "robust_scaler", .. }
        ));
    }
}
