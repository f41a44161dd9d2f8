pub mod functions;

use crate::state::SharedState;
use axum::{routing::get, Router};

/// Path prefix the site's forms post to.
pub const FUNCTIONS_PREFIX: &str = "/.netlify/functions";

async fn health() -> &'static str {
    "OK"
}

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest(FUNCTIONS_PREFIX, functions::router(state))
}
