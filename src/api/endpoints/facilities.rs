use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::models::Facility;

/// `GET /api/facilities/`
pub async fn list(State(ctx): State<ApiContext>) -> Result<Json<Vec<Facility>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(db::list_facilities(&conn)?))
}
