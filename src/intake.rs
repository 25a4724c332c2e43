//! Admission intake: the typed request schema for the prediction endpoint.
//!
//! The admission form posts loosely typed JSON — flags arrive as booleans,
//! measurements as strings. [`AdmissionForm`] accepts those shapes, and
//! [`AdmissionForm::validate`] turns the form into an [`Admission`] or fails
//! with a [`ValidationError`] naming the offending field, before anything
//! reaches the feature pipeline.

use serde::Deserialize;

use crate::inference::features::AdmissionAttributes;
use crate::models::{ConditionFlags, Measurements};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Missing field '{0}'")]
    MissingField(&'static str),

    #[error("Field '{field}' must be {expected}, got {value}")]
    InvalidValue {
        field: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// A JSON scalar as submitted by the form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl FieldValue {
    fn as_f64(&self) -> Option<f64> {
        let v = match self {
            FieldValue::Bool(b) => f64::from(u8::from(*b)),
            FieldValue::Number(n) => n.as_f64()?,
            FieldValue::Text(s) => s.trim().parse().ok()?,
        };
        v.is_finite().then_some(v)
    }

    /// Integral numbers are taken as-is; fractional JSON numbers truncate
    /// toward zero. Text must spell an integer.
    fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Bool(b) => Some(i64::from(*b)),
            FieldValue::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                    .map(|f| f.trunc() as i64)
            }),
            FieldValue::Text(s) => s.trim().parse().ok(),
        }
    }

    fn as_text(&self) -> String {
        match self {
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }

    fn describe(&self) -> String {
        match self {
            FieldValue::Text(s) => format!("{s:?}"),
            other => other.as_text(),
        }
    }
}

/// The prediction request body. Every field is optional at the parsing
/// stage so that a missing field is reported by name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdmissionForm {
    #[serde(rename = "patientId")]
    pub patient_id: Option<FieldValue>,
    pub facility: Option<FieldValue>,
    pub gender: Option<FieldValue>,
    pub rcount: Option<FieldValue>,
    pub secondarydiagnosisnonicd9: Option<FieldValue>,

    pub dialysisrenalendstage: Option<FieldValue>,
    pub asthma: Option<FieldValue>,
    pub irondef: Option<FieldValue>,
    pub pneum: Option<FieldValue>,
    pub substancedependence: Option<FieldValue>,
    pub psychologicaldisordermajor: Option<FieldValue>,
    pub depress: Option<FieldValue>,
    pub psychother: Option<FieldValue>,
    pub fibrosisandother: Option<FieldValue>,
    pub malnutrition: Option<FieldValue>,
    pub hemo: Option<FieldValue>,

    pub hemoglobin: Option<FieldValue>,
    pub leukocytes: Option<FieldValue>,
    pub sodium: Option<FieldValue>,
    pub glucose: Option<FieldValue>,
    pub bloodureanitro: Option<FieldValue>,
    pub creatinine: Option<FieldValue>,
    pub bmi: Option<FieldValue>,
    pub pulse: Option<FieldValue>,
    pub respiration: Option<FieldValue>,
}

/// A validated admission request.
#[derive(Debug, Clone, PartialEq)]
pub struct Admission {
    pub patient_id: i64,
    pub facility_name: String,
    pub attributes: AdmissionAttributes,
}

impl AdmissionForm {
    /// Parse a raw request body.
    pub fn from_json(body: &[u8]) -> Result<Self, ValidationError> {
        serde_json::from_slice(body).map_err(|e| ValidationError::MalformedBody(e.to_string()))
    }

    pub fn validate(&self) -> Result<Admission, ValidationError> {
        let flags = ConditionFlags {
            dialysisrenalendstage: flag("dialysisrenalendstage", &self.dialysisrenalendstage)?,
            asthma: flag("asthma", &self.asthma)?,
            irondef: flag("irondef", &self.irondef)?,
            pneum: flag("pneum", &self.pneum)?,
            substancedependence: flag("substancedependence", &self.substancedependence)?,
            psychologicaldisordermajor: flag(
                "psychologicaldisordermajor",
                &self.psychologicaldisordermajor,
            )?,
            depress: flag("depress", &self.depress)?,
            psychother: flag("psychother", &self.psychother)?,
            // Not a model input; older clients omit it.
            fibrosisandother: match &self.fibrosisandother {
                Some(_) => flag("fibrosisandother", &self.fibrosisandother)?,
                None => 0,
            },
            malnutrition: flag("malnutrition", &self.malnutrition)?,
            hemo: flag("hemo", &self.hemo)?,
        };

        let measurements = Measurements {
            hemoglobin: number("hemoglobin", &self.hemoglobin)?,
            leukocytes: number("leukocytes", &self.leukocytes)?,
            sodium: number("sodium", &self.sodium)?,
            glucose: number("glucose", &self.glucose)?,
            bloodureanitro: number("bloodureanitro", &self.bloodureanitro)?,
            creatinine: number("creatinine", &self.creatinine)?,
            bmi: number("bmi", &self.bmi)?,
            pulse: number("pulse", &self.pulse)?,
            respiration: number("respiration", &self.respiration)?,
        };

        Ok(Admission {
            patient_id: integer("patientId", &self.patient_id)?,
            facility_name: text("facility", &self.facility)?,
            attributes: AdmissionAttributes {
                gender: text("gender", &self.gender)?,
                rcount: require("rcount", &self.rcount)?.as_text(),
                secondarydiagnosisnonicd9: integer(
                    "secondarydiagnosisnonicd9",
                    &self.secondarydiagnosisnonicd9,
                )?,
                flags,
                measurements,
            },
        })
    }
}

fn require<'a>(
    field: &'static str,
    value: &'a Option<FieldValue>,
) -> Result<&'a FieldValue, ValidationError> {
    value.as_ref().ok_or(ValidationError::MissingField(field))
}

fn invalid(field: &'static str, expected: &'static str, value: &FieldValue) -> ValidationError {
    ValidationError::InvalidValue {
        field,
        expected,
        value: value.describe(),
    }
}

fn number(field: &'static str, value: &Option<FieldValue>) -> Result<f64, ValidationError> {
    let v = require(field, value)?;
    v.as_f64().ok_or_else(|| invalid(field, "a finite number", v))
}

fn integer(field: &'static str, value: &Option<FieldValue>) -> Result<i64, ValidationError> {
    let v = require(field, value)?;
    v.as_i64().ok_or_else(|| invalid(field, "an integer", v))
}

fn flag(field: &'static str, value: &Option<FieldValue>) -> Result<u8, ValidationError> {
    let v = require(field, value)?;
    let parsed = match v {
        FieldValue::Text(s) => match s.trim() {
            "true" | "True" => Some(1),
            "false" | "False" => Some(0),
            other => other.parse::<i64>().ok(),
        },
        other => other.as_i64(),
    };
    match parsed {
        Some(0) => Ok(0),
        Some(1) => Ok(1),
        _ => Err(invalid(field, "0 or 1", v)),
    }
}

fn text(field: &'static str, value: &Option<FieldValue>) -> Result<String, ValidationError> {
    match require(field, value)? {
        FieldValue::Text(s) if !s.is_empty() => Ok(s.clone()),
        other => Err(invalid(field, "a non-empty string", other)),
    }
}
