use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::MovieRecord,
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    query: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct AutocompleteQuery {
    #[serde(default)]
    q: String,
    limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    limit: Option<usize>,
}

/// Handler for title search: prefix matches first, then substring matches
pub async fn search(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<MovieRecord>>> {
    let query = params
        .query
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::InvalidInput("No search query provided!".to_string()))?;
    let limit = state.config.clamp_limit(params.limit, state.config.default_limit);

    let results = state.browse.search_by_title(&query, limit);
    tracing::info!(request_id = %request_id, query = %query, count = results.len(), "Search");

    if results.is_empty() {
        return Err(AppError::NotFound(format!(
            "No movies found matching '{}'.",
            query
        )));
    }

    Ok(Json(results))
}

/// Handler for autocomplete suggestions; always answers with a (possibly empty) list
pub async fn autocomplete(
    State(state): State<AppState>,
    Query(params): Query<AutocompleteQuery>,
) -> Json<Vec<String>> {
    let limit = state
        .config
        .clamp_limit(params.limit, state.config.autocomplete_limit);
    Json(state.browse.autocomplete(&params.q, limit))
}

/// Handler for a random selection of movies
pub async fn popular(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<LimitQuery>,
) -> AppResult<Json<Vec<MovieRecord>>> {
    let limit = state.config.clamp_limit(params.limit, state.config.default_limit);

    match state.browse.popular(limit) {
        Ok(results) => Ok(Json(results)),
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Popular movies unavailable");
            Err(AppError::Unavailable(
                "Unable to fetch popular movies.".to_string(),
            ))
        }
    }
}
