use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    config::Config,
    db::{CatalogStore, NeighborRanking, SimilarityIndex},
    services::{BrowseService, RecommendationEngine},
};

/// Shared application state
///
/// Everything here is built once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<CatalogStore>,
    pub browse: BrowseService,
    pub recommender: RecommendationEngine,
    pub loaded_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config, catalog: CatalogStore, similarity: Option<SimilarityIndex>) -> Self {
        let catalog = Arc::new(catalog);
        let similarity = similarity.map(|index| Arc::new(index) as Arc<dyn NeighborRanking>);

        if let Some(index) = &similarity {
            if index.dimension() < catalog.len() {
                tracing::warn!(
                    catalog = catalog.len(),
                    dimension = index.dimension(),
                    "Similarity matrix is older than the catalog; newer titles use fallbacks"
                );
            }
        }

        Self {
            browse: BrowseService::new(catalog.clone(), config.poster_base_url.clone()),
            recommender: RecommendationEngine::new(
                catalog.clone(),
                similarity,
                config.poster_base_url.clone(),
            ),
            catalog,
            config: Arc::new(config),
            loaded_at: Utc::now(),
        }
    }

    /// Loads the catalog and similarity matrix named in `config`. Missing or
    /// corrupt artifacts leave the service running in a degraded mode.
    pub fn load(config: Config) -> Self {
        let catalog = CatalogStore::load_or_unavailable(&config.catalog_path);
        let similarity = SimilarityIndex::load_optional(&config.similarity_path);
        Self::new(config, catalog, similarity)
    }
}
