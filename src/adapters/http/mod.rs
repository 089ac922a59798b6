pub mod errors;
pub mod routes;
pub mod state;

use axum::{routing::post, Router};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::adapters::http::state::HttpState;

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/detect", post(routes::handle_detect))
        .layer(CatchPanicLayer::custom(errors::panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
