use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Failures reading from the in-memory catalog
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Catalog unavailable: dataset failed to load")]
    Unavailable,

    #[error("Catalog index {index} out of range (catalog size {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Failures ranking against the precomputed similarity matrix
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SimilarityError {
    #[error("Catalog index {index} outside similarity matrix (dimension {dimension})")]
    IndexOutOfBounds { index: usize, dimension: usize },
}

/// Failures reading the startup artifacts from disk
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Similarity matrix is not square: row {row} has {len} columns, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },
}

/// No resolution strategy matched the query
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("No catalog entry matches '{query}'")]
pub struct TitleNotFound {
    pub query: String,
}

/// Why a recommendation request produced no results
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NoRecommendation {
    #[error("No catalog entry matches '{query}'")]
    TitleNotFound { query: String },

    #[error("Catalog unavailable")]
    CatalogUnavailable,

    #[error("Similarity index unavailable")]
    SimilarityIndexUnavailable,
}

impl From<TitleNotFound> for NoRecommendation {
    fn from(err: TitleNotFound) -> Self {
        NoRecommendation::TitleNotFound { query: err.query }
    }
}

impl From<CatalogError> for NoRecommendation {
    fn from(_: CatalogError) -> Self {
        NoRecommendation::CatalogUnavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let response = AppError::NotFound("Movie 'x' not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unavailable_maps_to_503() {
        let response = AppError::Unavailable("Dataset not available".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_invalid_input_maps_to_400() {
        let response = AppError::InvalidInput("No movie title provided!".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_catalog_error_degrades_to_no_recommendation() {
        let reason: NoRecommendation = CatalogError::IndexOutOfRange { index: 4, len: 2 }.into();
        assert_eq!(reason, NoRecommendation::CatalogUnavailable);
    }
}
