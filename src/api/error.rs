//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core_state::CoreError;
use crate::db::DatabaseError;
use crate::inference::InferenceError;
use crate::intake::ValidationError;
use crate::prediction::PredictionError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Type conversion failed: {0}")]
    TypeConversion(String),
    #[error("Encoding failed: {0}")]
    Encoding(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid request method")]
    InvalidMethod,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::TypeConversion(detail) => (
                StatusCode::BAD_REQUEST,
                "TYPE_CONVERSION",
                detail.clone(),
            ),
            ApiError::Encoding(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "ENCODING",
                detail.clone(),
            ),
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "CONFLICT", detail.clone()),
            ApiError::InvalidMethod => (
                StatusCode::BAD_REQUEST,
                "INVALID_METHOD",
                "Invalid request method.".to_string(),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity_type, id } => {
                ApiError::NotFound(format!("{entity_type} {id} not found"))
            }
            DatabaseError::Conflict(detail) => ApiError::Conflict(detail),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Database(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::TypeConversion(err.to_string())
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::UnknownCategory { .. } => ApiError::Encoding(err.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<PredictionError> for ApiError {
    fn from(err: PredictionError) -> Self {
        match err {
            PredictionError::FacilityNotFound(name) => {
                ApiError::NotFound(format!("Facility '{name}' not found"))
            }
            PredictionError::Inference(e) => e.into(),
            PredictionError::Database(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn not_found_returns_404() {
        let response = ApiError::NotFound("Patient 3 not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
        assert_eq!(json["error"]["message"], "Patient 3 not found");
    }

    #[tokio::test]
    async fn invalid_method_returns_400() {
        let response = ApiError::InvalidMethod.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INVALID_METHOD");
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let response = ApiError::Internal("disk full".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }

    #[test]
    fn unknown_category_maps_to_encoding() {
        let err: ApiError = PredictionError::Inference(InferenceError::UnknownCategory {
            feature: "gender".into(),
            value: "X".into(),
        })
        .into();
        assert!(matches!(err, ApiError::Encoding(_)));
        assert_eq!(err.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn database_conflict_maps_to_409() {
        let err: ApiError = DatabaseError::Conflict("patient 1 already exists".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn validation_maps_to_type_conversion() {
        let err: ApiError = ValidationError::MissingField("bmi").into();
        assert!(matches!(err, ApiError::TypeConversion(ref m) if m.contains("bmi")));
    }

    #[test]
    fn missing_facility_maps_to_404() {
        let err: ApiError = PredictionError::FacilityNotFound("Nowhere".into()).into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
