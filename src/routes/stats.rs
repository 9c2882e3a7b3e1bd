use axum::{extract::State, Json};

use crate::{
    error::{AppError, AppResult},
    models::StatsSummary,
    routes::AppState,
};

/// Handler for catalog statistics
pub async fn stats(State(state): State<AppState>) -> AppResult<Json<StatsSummary>> {
    state
        .browse
        .stats_summary(state.recommender.similarity_dimension())
        .map(Json)
        .map_err(|e| {
            tracing::warn!(error = %e, "Stats requested without a catalog");
            AppError::Unavailable("Dataset not available".to_string())
        })
}
