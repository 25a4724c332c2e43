//! HTTP router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Every route answers with and without a trailing slash, and the whole
//! surface is also mounted under `/ml_model` where the deployed frontend
//! expects it.
//!
//! Middleware stack (outermost → innermost):
//! 1. CORS → 2. Audit logger

use std::sync::Arc;

use axum::routing::{get, post, MethodRouter};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::core_state::CoreState;

/// Prefix used by the browser frontend.
pub const FRONTEND_PREFIX: &str = "/ml_model";

/// Build the API router over shared state.
pub fn api_router(core: Arc<CoreState>) -> Router {
    let ctx = ApiContext::new(core);
    build_router(ctx)
}

/// Register `path` and `path/` with the same handlers.
fn route_slashed(
    router: Router<ApiContext>,
    path: &str,
    method_router: MethodRouter<ApiContext>,
) -> Router<ApiContext> {
    router
        .route(path, method_router.clone())
        .route(&format!("{path}/"), method_router)
}

fn build_router(ctx: ApiContext) -> Router {
    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let routes = [
        (
            "/predict",
            post(endpoints::predict::predict).fallback(endpoints::predict::invalid_method),
        ),
        ("/api/health", get(endpoints::health::check)),
        ("/api/facilities", get(endpoints::facilities::list)),
        ("/api/patients", get(endpoints::patients::list)),
        ("/api/patient/max-id", get(endpoints::patients::max_id)),
        ("/api/checkout-patients", get(endpoints::patients::checkout)),
        (
            "/api/discharge-patient/:patient_id",
            post(endpoints::patients::discharge).fallback(endpoints::predict::invalid_method),
        ),
    ];

    let api: Router = routes
        .into_iter()
        .fold(Router::new(), |router, (path, method_router)| {
            route_slashed(router, path, method_router)
        })
        .with_state(ctx);

    Router::new()
        .merge(api.clone())
        .nest(FRONTEND_PREFIX, api)
        // Middleware stack (innermost first, outermost last):
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(CorsLayer::permissive())
}
