//! Shared types for the API layer.

use std::sync::Arc;

use serde::Serialize;

use crate::core_state::CoreState;
use crate::models::CheckoutEntry;

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// One entry per submitted row; the form submits exactly one.
    pub prediction: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct MaxIdResponse {
    #[serde(rename = "maxId")]
    pub max_id: i64,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub patients: Vec<CheckoutEntry>,
}

#[derive(Debug, Serialize)]
pub struct DischargeResponse {
    pub status: &'static str,
    pub length_of_stay: i64,
}
