use std::sync::Arc;

use rand::Rng;

use crate::{
    db::{CatalogStore, NeighborRanking},
    error::{CatalogError, NoRecommendation, SimilarityError},
    models::{
        title_case, CatalogEntry, MatchResult, MovieRecord, RecommendationSet,
        RecommendationSource,
    },
    services::title_resolver::TitleResolver,
};

/// Maximum number of recommendations returned for one title
pub const RECOMMENDATION_COUNT: usize = 10;

/// Content-based recommendations for a free-text title
///
/// The resolved title's similarity row is used when the matrix covers it.
/// Titles added to the catalog after the matrix was built fall back to
/// movies sharing their first genre, and then to a random sample.
#[derive(Clone)]
pub struct RecommendationEngine {
    catalog: Arc<CatalogStore>,
    similarity: Option<Arc<dyn NeighborRanking>>,
    poster_base_url: String,
}

impl RecommendationEngine {
    pub fn new(
        catalog: Arc<CatalogStore>,
        similarity: Option<Arc<dyn NeighborRanking>>,
        poster_base_url: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            similarity,
            poster_base_url: poster_base_url.into(),
        }
    }

    /// Dimension of the loaded similarity matrix, if any
    pub fn similarity_dimension(&self) -> Option<usize> {
        self.similarity.as_ref().map(|s| s.dimension())
    }

    pub fn recommend(&self, title: &str) -> Result<RecommendationSet, NoRecommendation> {
        self.recommend_with(title, &mut rand::thread_rng())
    }

    pub fn recommend_with<R: Rng + ?Sized>(
        &self,
        title: &str,
        rng: &mut R,
    ) -> Result<RecommendationSet, NoRecommendation> {
        if !self.catalog.is_available() {
            tracing::error!(title = %title, "Recommendation requested without a catalog");
            return Err(NoRecommendation::CatalogUnavailable);
        }

        let Some(similarity) = self.similarity.as_deref() else {
            tracing::error!(title = %title, "Recommendation requested without a similarity matrix");
            return Err(NoRecommendation::SimilarityIndexUnavailable);
        };

        let matched = TitleResolver::new(&self.catalog).resolve(title)?;
        let index = matched.entry.index;

        let (source, entries) = if index < similarity.dimension() {
            match self.ranked(similarity, index) {
                Ok(entries) => (RecommendationSource::Similarity, entries),
                Err(e) => {
                    tracing::warn!(index, error = %e, "Similarity lookup failed, using fallback");
                    self.fallback(matched.entry, rng)?
                }
            }
        } else {
            tracing::warn!(
                index,
                dimension = similarity.dimension(),
                title = %matched.entry.title,
                "Title postdates the similarity matrix, using fallback"
            );
            self.fallback(matched.entry, rng)?
        };

        tracing::info!(
            title = %title,
            matched = %matched.entry.title,
            source = ?source,
            count = entries.len(),
            "Recommendations ready"
        );

        Ok(self.format(title, &matched, source, &entries))
    }

    fn ranked(
        &self,
        similarity: &dyn NeighborRanking,
        index: usize,
    ) -> Result<Vec<&CatalogEntry>, SimilarityError> {
        let neighbors = similarity.top_neighbors(index, RECOMMENDATION_COUNT)?;

        Ok(neighbors
            .into_iter()
            .filter_map(|neighbor| match self.catalog.lookup_by_index(neighbor.index) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(neighbor = neighbor.index, error = %e, "Skipping neighbor");
                    None
                }
            })
            .collect())
    }

    /// Genre fallback, then random fallback
    fn fallback<R: Rng + ?Sized>(
        &self,
        entry: &CatalogEntry,
        rng: &mut R,
    ) -> Result<(RecommendationSource, Vec<&CatalogEntry>), CatalogError> {
        if let Some(genre) = entry.primary_genre() {
            let same_genre: Vec<&CatalogEntry> = self
                .catalog
                .filter_by_genre_substring(genre)?
                .filter(|candidate| candidate.index != entry.index)
                .take(RECOMMENDATION_COUNT)
                .collect();

            if !same_genre.is_empty() {
                tracing::info!(genre = %genre, count = same_genre.len(), "Genre fallback");
                return Ok((RecommendationSource::GenreFallback, same_genre));
            }

            tracing::info!(genre = %genre, "No other titles share genre");
        }

        tracing::info!(index = entry.index, "Random fallback");
        let sample = self
            .catalog
            .sample_random_excluding(RECOMMENDATION_COUNT, entry.index, rng)?;

        Ok((RecommendationSource::RandomFallback, sample))
    }

    fn format(
        &self,
        query: &str,
        matched: &MatchResult<'_>,
        source: RecommendationSource,
        entries: &[&CatalogEntry],
    ) -> RecommendationSet {
        RecommendationSet {
            query: query.trim().to_string(),
            matched_title: title_case(&matched.entry.title),
            match_strategy: matched.strategy,
            source,
            results: entries
                .iter()
                .map(|entry| MovieRecord::from_entry(entry, &self.poster_base_url))
                .collect(),
        }
    }
}
