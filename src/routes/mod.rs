use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

pub mod genres;
pub mod recommendations;
pub mod state;
pub mod stats;
pub mod titles;

pub use state::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/recommend", get(recommendations::recommend))
        .route("/search", get(titles::search))
        .route("/autocomplete", get(titles::autocomplete))
        .route("/popular", get(titles::popular))
        .route("/genres", get(genres::list_genres))
        .route("/genre/:genre_name", get(genres::movies_by_genre))
        .route("/stats", get(stats::stats))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "catalog_loaded": state.catalog.is_available(),
            "total_movies": state.catalog.len(),
            "similarity_dimension": state.recommender.similarity_dimension(),
            "loaded_at": state.loaded_at,
        })),
    )
}
