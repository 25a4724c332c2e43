//! Prediction service: admission in, rounded length of stay out.
//!
//! Resolves the facility, runs the feature pipeline and the model, and
//! records the new encounter. Facility lookup and the insert share one
//! transaction; the prediction is only returned after it commits.

use std::sync::Arc;

use chrono::NaiveDate;
use rusqlite::{Connection, TransactionBehavior};

use crate::db::{self, DatabaseError};
use crate::inference::features::{build_feature_row, normalize_gender, AdmissionAttributes};
use crate::inference::{ArtifactStore, InferenceError};
use crate::intake::Admission;
use crate::models::Patient;

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("Facility not found: {0}")]
    FacilityNotFound(String),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<rusqlite::Error> for PredictionError {
    fn from(err: rusqlite::Error) -> Self {
        PredictionError::Database(err.into())
    }
}

/// Round to a whole number of days, ties to even.
pub fn round_days(raw: f64) -> Result<i64, InferenceError> {
    if !raw.is_finite() {
        return Err(InferenceError::NonFinitePrediction(raw));
    }
    Ok(raw.round_ties_even() as i64)
}

#[derive(Clone)]
pub struct PredictionService {
    artifacts: Arc<ArtifactStore>,
}

impl PredictionService {
    pub fn new(artifacts: Arc<ArtifactStore>) -> Self {
        Self { artifacts }
    }

    /// Predicted length of stay in whole days. Pure: no storage access.
    pub fn predict_days(&self, attrs: &AdmissionAttributes) -> Result<i64, InferenceError> {
        let row = build_feature_row(&self.artifacts, attrs)?;
        let raw = self.artifacts.predict(row.view())?;
        round_days(raw)
    }

    /// Predict and record a new encounter admitted on `today`.
    pub fn admit(
        &self,
        conn: &mut Connection,
        admission: &Admission,
        today: NaiveDate,
    ) -> Result<i64, PredictionError> {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let facility = db::get_facility_by_name(&tx, &admission.facility_name)?
            .ok_or_else(|| PredictionError::FacilityNotFound(admission.facility_name.clone()))?;

        let attrs = &admission.attributes;
        let days = self.predict_days(attrs)?;

        let patient = Patient {
            eid: admission.patient_id,
            vdate: today,
            rcount: attrs.rcount.clone(),
            gender: normalize_gender(&attrs.gender).to_string(),
            flags: attrs.flags,
            measurements: attrs.measurements,
            secondarydiagnosisnonicd9: attrs.secondarydiagnosisnonicd9,
            discharged: None,
            facid: facility.facid,
            lengthofstay: None,
            pred_lengthofstay: days,
        };
        db::insert_patient(&tx, &patient)?;
        tx.commit()?;

        tracing::info!(
            eid = patient.eid,
            facility = %facility.name,
            predicted_days = days,
            "Patient admitted"
        );
        Ok(days)
    }
}
