use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{create_mapping_handler, health_handler, list_mappings_handler};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route(
                "/mapping",
                get(list_mappings_handler).post(create_mapping_handler),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
