//! HTTP surface.
//!
//! Thin adapters from requests to the prediction service and the ward
//! workflow. `api_router()` returns a composable `Router`; `server` binds it.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{ApiServer, ServerError};
pub use types::ApiContext;
