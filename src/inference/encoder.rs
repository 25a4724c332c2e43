use std::collections::HashSet;

use serde::Deserialize;

use super::features::FeatureFrame;
use super::InferenceError;

/// One categorical input of the encoder.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EncodedFeature {
    pub name: String,
    /// Vocabulary fixed at fit time, in output column order.
    pub categories: Vec<String>,
    /// Category fitted with "drop first": it produces no column and encodes
    /// as all zeros.
    #[serde(default)]
    pub drop: Option<String>,
}

/// Pre-fitted one-hot encoder.
///
/// Output columns are named `<feature>_<category>`. Values outside a
/// feature's vocabulary are rejected rather than encoded as all zeros.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OneHotEncoder {
    pub features: Vec<EncodedFeature>,
}

impl OneHotEncoder {
    /// Structural checks run once at load time.
    pub fn validate(&self) -> Result<(), InferenceError> {
        let invalid = |reason: String| InferenceError::InvalidArtifact {
            artifact: "onehot_encoder",
            reason,
        };

        let mut names = HashSet::new();
        for feature in &self.features {
            if !names.insert(feature.name.as_str()) {
                return Err(invalid(format!("duplicate feature '{}'", feature.name)));
            }
            if feature.categories.is_empty() {
                return Err(invalid(format!("feature '{}' has no categories", feature.name)));
            }
            let mut seen = HashSet::new();
            for category in &feature.categories {
                if !seen.insert(category.as_str()) {
                    return Err(invalid(format!(
                        "feature '{}' repeats category '{category}'",
                        feature.name
                    )));
                }
            }
            if let Some(drop) = &feature.drop {
                if !seen.contains(drop.as_str()) {
                    return Err(invalid(format!(
                        "feature '{}' drops unknown category '{drop}'",
                        feature.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Output column names, in order.
    pub fn feature_names_out(&self) -> Vec<String> {
        self.features
            .iter()
            .flat_map(|f| {
                f.categories
                    .iter()
                    .filter(move |c| f.drop.as_deref() != Some(c.as_str()))
                    .map(move |c| format!("{}_{}", f.name, c))
            })
            .collect()
    }

    /// Encode one row. `row` is `(feature, value)` pairs in the encoder's
    /// feature order.
    pub fn transform(&self, row: &[(&str, &str)]) -> Result<FeatureFrame, InferenceError> {
        let given: Vec<&str> = row.iter().map(|(name, _)| *name).collect();
        let fitted: Vec<&str> = self.features.iter().map(|f| f.name.as_str()).collect();
        if given != fitted {
            return Err(InferenceError::ColumnMismatch {
                expected: fitted.iter().map(|s| s.to_string()).collect(),
                actual: given.iter().map(|s| s.to_string()).collect(),
            });
        }

        let mut frame = FeatureFrame::default();
        for (feature, (_, value)) in self.features.iter().zip(row) {
            if !feature.categories.iter().any(|c| c == value) {
                return Err(InferenceError::UnknownCategory {
                    feature: feature.name.clone(),
                    value: value.to_string(),
                });
            }
            for category in &feature.categories {
                if feature.drop.as_deref() == Some(category.as_str()) {
                    continue;
                }
                let hot = if category == value { 1.0 } else { 0.0 };
                frame.push(format!("{}_{}", feature.name, category), hot);
            }
        }
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder() -> OneHotEncoder {
        serde_json::from_str(
            r#"{"features":[
                {"name":"gender","categories":["F","M"],"drop":"F"},
                {"name":"rcount","categories":["0","1","2","3","4","5+"],"drop":"0"}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn dropped_category_has_no_column() {
        let names = encoder().feature_names_out();
        assert_eq!(
            names,
            ["gender_M", "rcount_1", "rcount_2", "rcount_3", "rcount_4", "rcount_5+"]
        );
    }

    #[test]
    fn encodes_one_hot() {
        let frame = encoder()
            .transform(&[("gender", "M"), ("rcount", "5+")])
            .unwrap();
        assert_eq!(frame.columns(), encoder().feature_names_out().as_slice());
        assert_eq!(frame.values(), &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn dropped_category_encodes_as_zeros() {
        let frame = encoder()
            .transform(&[("gender", "F"), ("rcount", "0")])
            .unwrap();
        assert!(frame.values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn unseen_category_is_rejected() {
        let err = encoder()
            .transform(&[("gender", "Other"), ("rcount", "1")])
            .unwrap_err();
        match err {
            InferenceError::UnknownCategory { feature, value } => {
                assert_eq!(feature, "gender");
                assert_eq!(value, "Other");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn input_order_must_match_fit_order() {
        let err = encoder()
            .transform(&[("rcount", "1"), ("gender", "M")])
            .unwrap_err();
        assert!(matches!(err, InferenceError::ColumnMismatch { .. }));
    }

    #[test]
    fn validate_rejects_unknown_drop() {
        let enc: OneHotEncoder = serde_json::from_str(
            r#"{"features":[{"name":"gender","categories":["F","M"],"drop":"X"}]}"#,
        )
        .unwrap();
        assert!(enc.validate().is_err());
        assert!(encoder().validate().is_ok());
    }
}
