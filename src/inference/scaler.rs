use serde::Deserialize;

use super::features::FeatureFrame;
use super::InferenceError;

/// Pre-fitted robust scaler: `(x - center) / scale`, where `center` is the
/// fitted median and `scale` the fitted interquartile range.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RobustScaler {
    pub features: Vec<String>,
    pub center: Vec<f64>,
    pub scale: Vec<f64>,
}

impl RobustScaler {
    pub fn validate(&self) -> Result<(), InferenceError> {
        let n = self.features.len();
        if self.center.len() != n || self.scale.len() != n {
            return Err(InferenceError::InvalidArtifact {
                artifact: "robust_scaler",
                reason: format!(
                    "{n} features but {} centers and {} scales",
                    self.center.len(),
                    self.scale.len()
                ),
            });
        }
        if self
            .center
            .iter()
            .chain(&self.scale)
            .any(|v| !v.is_finite())
        {
            return Err(InferenceError::InvalidArtifact {
                artifact: "robust_scaler",
                reason: "non-finite center or scale".into(),
            });
        }
        Ok(())
    }

    /// Scale one row. `row` is `(feature, value)` pairs in the scaler's
    /// feature order.
    pub fn transform(&self, row: &[(&str, f64)]) -> Result<FeatureFrame, InferenceError> {
        let names_match = row.len() == self.features.len()
            && row.iter().zip(&self.features).all(|((name, _), f)| name == f);
        if !names_match {
            return Err(InferenceError::ColumnMismatch {
                expected: self.features.clone(),
                actual: row.iter().map(|(name, _)| name.to_string()).collect(),
            });
        }

        let mut frame = FeatureFrame::default();
        for (i, (name, value)) in row.iter().enumerate() {
            // A zero IQR means the feature was constant at fit time; it is
            // centered but not scaled.
            let scale = if self.scale[i] == 0.0 { 1.0 } else { self.scale[i] };
            frame.push(name.to_string(), (value - self.center[i]) / scale);
        }
        Ok(frame)
    }
}
