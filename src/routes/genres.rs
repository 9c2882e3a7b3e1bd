use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::MovieRecord,
    routes::AppState,
};

#[derive(Debug, Deserialize)]
pub struct GenreQuery {
    limit: Option<usize>,
}

/// Handler listing every distinct genre
pub async fn list_genres(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.browse.list_genres())
}

/// Handler for movies whose genre list contains `genre_name`
pub async fn movies_by_genre(
    State(state): State<AppState>,
    Path(genre_name): Path<String>,
    Query(params): Query<GenreQuery>,
) -> AppResult<Json<Vec<MovieRecord>>> {
    let limit = state.config.clamp_limit(params.limit, state.config.default_limit);
    let results = state.browse.by_genre(&genre_name, limit);

    if results.is_empty() {
        return Err(AppError::NotFound(format!(
            "No movies found for genre '{}'.",
            genre_name
        )));
    }

    Ok(Json(results))
}
