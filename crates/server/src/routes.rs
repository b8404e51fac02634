use axum::{routing::get, Json, Router};
use serde::Deserialize;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::{pagination::Pagination, types::Health};
use service::services::Services;

pub mod cities;
pub mod departments;
pub mod roles;
pub mod users;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
}

/// `?q=&page=&size=` for searches, `?page=&size=` for listings.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

impl SearchQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination { page: self.page, size: self.size }
    }
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the application router over the given services.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .nest("/departments", departments::router())
        .nest("/roles", roles::router())
        .nest("/cities", cities::router())
        .nest("/users", users::router());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx at error level
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
