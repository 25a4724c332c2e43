//! Length-of-stay prediction endpoint.
//!
//! `POST /predict/` — validates the admission body, predicts, and records the
//! encounter. The body is taken as raw bytes so a malformed payload surfaces
//! as a type conversion error rather than axum's own rejection.

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, PredictResponse};
use crate::core_state::today;
use crate::intake::AdmissionForm;

pub async fn predict(
    State(ctx): State<ApiContext>,
    body: Bytes,
) -> Result<Json<PredictResponse>, ApiError> {
    let admission = AdmissionForm::from_json(&body)
        .and_then(|form| form.validate())
        .map_err(|e| {
            tracing::warn!(error = %e, "Rejected prediction request");
            ApiError::from(e)
        })?;

    let mut conn = ctx.core.open_db()?;
    let days = ctx
        .core
        .predictor()
        .admit(&mut conn, &admission, today())?;

    Ok(Json(PredictResponse {
        prediction: vec![days],
    }))
}

/// Any verb other than POST on a state-changing route.
pub async fn invalid_method() -> ApiError {
    ApiError::InvalidMethod
}
