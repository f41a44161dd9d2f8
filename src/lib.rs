pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod state;
pub mod store;
pub mod web;

use axum::Router;
use state::SharedState;

pub fn build_router(state: SharedState) -> Router {
    web::routes(state)
}
