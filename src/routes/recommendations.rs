use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::RecommendationSet,
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    title: Option<String>,
}

/// Handler for the recommendation endpoint
///
/// Every reason for producing nothing reaches the caller as "not found";
/// the underlying cause is only logged.
pub async fn recommend(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RecommendQuery>,
) -> AppResult<Json<RecommendationSet>> {
    let title = params
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .ok_or_else(|| AppError::InvalidInput("No movie title provided!".to_string()))?;

    tracing::info!(request_id = %request_id, title = %title, "Processing recommendation request");

    match state.recommender.recommend(title) {
        Ok(set) => {
            tracing::info!(
                request_id = %request_id,
                count = set.results.len(),
                source = ?set.source,
                "Returning recommendations"
            );
            Ok(Json(set))
        }
        Err(reason) => {
            tracing::warn!(request_id = %request_id, reason = %reason, "No recommendation");
            Err(AppError::NotFound(format!(
                "Movie '{}' not found. Please check the spelling or try searching for it first.",
                title
            )))
        }
    }
}
