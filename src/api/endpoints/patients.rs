//! Patient record endpoints: listing, the next-id hint, the checkout list,
//! and discharge.

use axum::extract::{Path, State};
use axum::Json;

use crate::admissions;
use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CheckoutResponse, DischargeResponse, MaxIdResponse};
use crate::core_state::today;
use crate::db;
use crate::models::Patient;

/// `GET /api/patients/`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<Patient>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(db::list_patients(&conn)?))
}

/// `GET /api/patient/max-id/` — advisory id for the next admission.
pub async fn max_id(State(ctx): State<ApiContext>) -> Result<Json<MaxIdResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(MaxIdResponse {
        max_id: admissions::next_patient_id(&conn)?,
    }))
}

/// `GET /api/checkout-patients/` — encounters not yet discharged.
pub async fn checkout(
    State(ctx): State<ApiContext>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(CheckoutResponse {
        patients: admissions::checkout_list(&conn)?,
    }))
}

/// `POST /api/discharge-patient/:patient_id/`
pub async fn discharge(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<i64>,
) -> Result<Json<DischargeResponse>, ApiError> {
    let mut conn = ctx.core.open_db()?;
    let length_of_stay = admissions::discharge(&mut conn, patient_id, today())?;

    Ok(Json(DischargeResponse {
        status: "success",
        length_of_stay,
    }))
}
