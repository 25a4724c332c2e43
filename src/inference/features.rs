//! Feature pipeline: one admission → one model row.
//!
//! Every step is a pure function. The final row layout is fixed by
//! [`MODEL_COLUMNS`]; [`FeatureFrame::into_row`] refuses to produce an array
//! unless the frame's column names match it exactly.

use ndarray::Array1;

use super::{ArtifactStore, InferenceError, OneHotEncoder, RobustScaler};
use crate::models::{ConditionFlags, Measurements};

/// Added before taking the log of right-skewed measurements.
pub const LOG_EPSILON: f64 = 1e-9;

/// Categorical inputs, in encoder order.
pub const CATEGORICAL_FEATURES: [&str; 3] = ["gender", "rcount", "secondarydiagnosisnonicd9"];

/// Measurements passed through the robust scaler, in scaler order.
pub const SCALED_MEASUREMENTS: [&str; 6] =
    ["hemoglobin", "sodium", "glucose", "creatinine", "bmi", "pulse"];

/// Measurements passed through `ln(x + ε)`.
pub const LOG_MEASUREMENTS: [&str; 2] = ["leukocytes", "bloodureanitro"];

/// Condition flags the model consumes. `fibrosisandother` is not one of them.
pub const MODEL_FLAGS: [&str; 10] = [
    "dialysisrenalendstage",
    "asthma",
    "irondef",
    "pneum",
    "substancedependence",
    "psychologicaldisordermajor",
    "depress",
    "psychother",
    "malnutrition",
    "hemo",
];

/// Column order the model was trained on.
pub const MODEL_COLUMNS: [&str; 23] = [
    "dialysisrenalendstage",
    "asthma",
    "irondef",
    "pneum",
    "substancedependence",
    "psychologicaldisordermajor",
    "depress",
    "psychother",
    "malnutrition",
    "hemo",
    "hemoglobin",
    "leukocytes",
    "sodium",
    "glucose",
    "bloodureanitro",
    "creatinine",
    "bmi",
    "pulse",
    "rcount_1",
    "rcount_2",
    "rcount_3",
    "rcount_4",
    "rcount_5+",
];

/// Admission attributes the model depends on, as received.
#[derive(Debug, Clone, PartialEq)]
pub struct AdmissionAttributes {
    /// Free text; "Male"/"Female" are normalized, anything else is passed on.
    pub gender: String,
    pub rcount: String,
    pub secondarydiagnosisnonicd9: i64,
    pub flags: ConditionFlags,
    pub measurements: Measurements,
}

// ═══════════════════════════════════════════════════════════
// FeatureFrame — a single named row
// ═══════════════════════════════════════════════════════════

/// A single row of named feature values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFrame {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl FeatureFrame {
    pub fn push(&mut self, column: impl Into<String>, value: f64) {
        self.columns.push(column.into());
        self.values.push(value);
    }

    /// Append all columns of `other` after the existing ones.
    pub fn concat(mut self, other: FeatureFrame) -> Self {
        self.columns.extend(other.columns);
        self.values.extend(other.values);
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }

    /// Project onto `order`, dropping every other column.
    pub fn select(&self, order: &[&str]) -> Result<FeatureFrame, InferenceError> {
        let mut out = FeatureFrame::default();
        for column in order {
            let value = self.get(column).ok_or_else(|| InferenceError::ColumnMismatch {
                expected: order.iter().map(|c| c.to_string()).collect(),
                actual: self.columns.clone(),
            })?;
            out.push(*column, value);
        }
        Ok(out)
    }

    /// Convert to a bare array, asserting the column names are exactly
    /// `expected`, in order.
    pub fn into_row(self, expected: &[String]) -> Result<Array1<f64>, InferenceError> {
        if self.columns != expected {
            return Err(InferenceError::ColumnMismatch {
                expected: expected.to_vec(),
                actual: self.columns,
            });
        }
        Ok(Array1::from(self.values))
    }
}

// ═══════════════════════════════════════════════════════════
// Pipeline steps
// ═══════════════════════════════════════════════════════════

/// "Male" → "M", "Female" → "F"; anything else is returned unchanged and
/// left for the encoder to reject.
pub fn normalize_gender(raw: &str) -> &str {
    match raw {
        "Male" => "M",
        "Female" => "F",
        other => other,
    }
}

pub fn encode_categoricals(
    encoder: &OneHotEncoder,
    attrs: &AdmissionAttributes,
) -> Result<FeatureFrame, InferenceError> {
    let secondary = attrs.secondarydiagnosisnonicd9.to_string();
    encoder.transform(&[
        (CATEGORICAL_FEATURES[0], normalize_gender(&attrs.gender)),
        (CATEGORICAL_FEATURES[1], attrs.rcount.as_str()),
        (CATEGORICAL_FEATURES[2], secondary.as_str()),
    ])
}

pub fn scale_measurements(
    scaler: &RobustScaler,
    m: &Measurements,
) -> Result<FeatureFrame, InferenceError> {
    scaler.transform(&[
        ("hemoglobin", m.hemoglobin),
        ("sodium", m.sodium),
        ("glucose", m.glucose),
        ("creatinine", m.creatinine),
        ("bmi", m.bmi),
        ("pulse", m.pulse),
    ])
}

/// `ln(x + ε)`. Zero maps to `ln(ε)`; negative inputs yield NaN, which tree
/// models route down their missing-value branch.
pub fn log_measurements(m: &Measurements) -> FeatureFrame {
    let mut frame = FeatureFrame::default();
    frame.push("leukocytes", (m.leukocytes + LOG_EPSILON).ln());
    frame.push("bloodureanitro", (m.bloodureanitro + LOG_EPSILON).ln());
    frame
}

pub fn flag_frame(flags: &ConditionFlags) -> FeatureFrame {
    let values = [
        flags.dialysisrenalendstage,
        flags.asthma,
        flags.irondef,
        flags.pneum,
        flags.substancedependence,
        flags.psychologicaldisordermajor,
        flags.depress,
        flags.psychother,
        flags.malnutrition,
        flags.hemo,
    ];
    let mut frame = FeatureFrame::default();
    for (name, value) in MODEL_FLAGS.iter().zip(values) {
        frame.push(*name, f64::from(value));
    }
    frame
}

/// Run the whole pipeline and return the row in model column order.
pub fn build_feature_row(
    artifacts: &ArtifactStore,
    attrs: &AdmissionAttributes,
) -> Result<Array1<f64>, InferenceError> {
    let combined = flag_frame(&attrs.flags)
        .concat(encode_categoricals(artifacts.encoder(), attrs)?)
        .concat(scale_measurements(artifacts.scaler(), &attrs.measurements)?)
        .concat(log_measurements(&attrs.measurements));

    combined.select(&MODEL_COLUMNS)?.into_row(artifacts.model_columns())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::inference::artifacts::tests::demo_store;

    pub(crate) fn example_attributes() -> AdmissionAttributes {
        AdmissionAttributes {
            gender: "Male".into(),
            rcount: "2".into(),
            secondarydiagnosisnonicd9: 1,
            flags: ConditionFlags::default(),
            measurements: Measurements {
                hemoglobin: 12.5,
                leukocytes: 7.0,
                sodium: 140.0,
                glucose: 100.0,
                bloodureanitro: 15.0,
                creatinine: 1.0,
                bmi: 24.0,
                pulse: 70.0,
                respiration: 16.0,
            },
        }
    }

    #[test]
    fn gender_normalization() {
        assert_eq!(normalize_gender("Male"), "M");
        assert_eq!(normalize_gender("Female"), "F");
        assert_eq!(normalize_gender("male"), "male");
        assert_eq!(normalize_gender("M"), "M");
    }

    #[test]
    fn log_transform_guards_zero() {
        let mut m = example_attributes().measurements;
        m.leukocytes = 0.0;
        m.bloodureanitro = -1.0;
        let frame = log_measurements(&m);
        assert!((frame.get("leukocytes").unwrap() - LOG_EPSILON.ln()).abs() < 1e-12);
        assert!(frame.get("bloodureanitro").unwrap().is_nan());
    }

    #[test]
    fn flag_frame_skips_fibrosis() {
        let mut flags = ConditionFlags::default();
        flags.fibrosisandother = 1;
        flags.hemo = 1;
        let frame = flag_frame(&flags);
        assert_eq!(frame.columns(), MODEL_FLAGS.map(String::from));
        assert_eq!(frame.values().iter().sum::<f64>(), 1.0);
        assert_eq!(frame.get("hemo"), Some(1.0));
    }

    #[test]
    fn row_has_model_layout() {
        let store = demo_store();
        let row = build_feature_row(&store, &example_attributes()).unwrap();
        assert_eq!(row.len(), MODEL_COLUMNS.len());

        // rcount "2" → only rcount_2 is hot
        assert_eq!(&row.as_slice().unwrap()[18..], &[0.0, 1.0, 0.0, 0.0, 0.0]);
        // leukocytes sits at index 11 and is log transformed
        assert!((row[11] - (7.0f64 + LOG_EPSILON).ln()).abs() < 1e-12);
    }

    #[test]
    fn layout_is_independent_of_values() {
        let store = demo_store();
        let mut attrs = example_attributes();
        let baseline = build_feature_row(&store, &attrs).unwrap().len();

        for (gender, rcount) in [("Female", "0"), ("Male", "5+"), ("Female", "4")] {
            attrs.gender = gender.into();
            attrs.rcount = rcount.into();
            attrs.flags.asthma = 1;
            attrs.measurements.glucose = 310.0;
            let row = build_feature_row(&store, &attrs).unwrap();
            assert_eq!(row.len(), baseline);
        }
    }

    #[test]
    fn rcount_zero_encodes_as_all_zero_bucket() {
        let store = demo_store();
        let mut attrs = example_attributes();
        attrs.rcount = "0".into();
        let row = build_feature_row(&store, &attrs).unwrap();
        assert!(row.as_slice().unwrap()[18..].iter().all(|v| *v == 0.0));
    }

    #[test]
    fn unmapped_gender_fails_encoding() {
        let store = demo_store();
        let mut attrs = example_attributes();
        attrs.gender = "Unknown".into();
        let err = build_feature_row(&store, &attrs).unwrap_err();
        assert!(matches!(err, InferenceError::UnknownCategory { ref feature, .. } if feature == "gender"));
    }

    #[test]
    fn unseen_rcount_fails_encoding() {
        let store = demo_store();
        let mut attrs = example_attributes();
        attrs.rcount = "7".into();
        assert!(matches!(
            build_feature_row(&store, &attrs),
            Err(InferenceError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn select_reports_missing_columns() {
        let mut frame = FeatureFrame::default();
        frame.push("a", 1.0);
        let err = frame.select(&["a", "b"]).unwrap_err();
        assert!(matches!(err, InferenceError::ColumnMismatch { .. }));
    }

    #[test]
    fn into_row_rejects_reordered_columns() {
        let mut frame = FeatureFrame::default();
        frame.push("b", 2.0);
        frame.push("a", 1.0);
        let expected = vec!["a".to_string(), "b".to_string()];
        assert!(frame.clone().into_row(&expected).is_err());
        let row = frame.select(&["a", "b"]).unwrap().into_row(&expected).unwrap();
        assert_eq!(row.to_vec(), vec![1.0, 2.0]);
    }
}
