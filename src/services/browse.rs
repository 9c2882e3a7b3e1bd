use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;

use crate::{
    db::CatalogStore,
    error::CatalogError,
    models::{normalize_title, title_case, CatalogEntry, MovieRecord, StatsSummary, Tally},
};

/// Autocomplete ignores queries shorter than this
pub const MIN_AUTOCOMPLETE_CHARS: usize = 2;

const STATS_TOP_GENRES: usize = 5;
const STATS_TOP_DIRECTORS: usize = 10;

/// Search and browse over the catalog, independent of the similarity matrix
///
/// Listing operations degrade to an empty result when the catalog is
/// unavailable; the failure is logged here.
#[derive(Clone)]
pub struct BrowseService {
    catalog: Arc<CatalogStore>,
    poster_base_url: String,
}

impl BrowseService {
    pub fn new(catalog: Arc<CatalogStore>, poster_base_url: impl Into<String>) -> Self {
        Self {
            catalog,
            poster_base_url: poster_base_url.into(),
        }
    }

    /// Prefix matches first, then titles that only contain the query,
    /// each group in catalog order
    pub fn search_by_title(&self, query: &str, limit: usize) -> Vec<MovieRecord> {
        let query = normalize_title(query);
        if query.is_empty() {
            return Vec::new();
        }

        let matches = self.catalog.filter_by_title_prefix(&query).and_then(|prefix| {
            let contains_only = self
                .catalog
                .filter_by_title_substring(&query)?
                .filter(|entry| !entry.title.starts_with(&query));
            Ok(self.format(prefix.chain(contains_only).take(limit)))
        });

        or_empty(matches, "search")
    }

    /// Title-cased titles starting with the query. Queries under two
    /// characters return nothing.
    pub fn autocomplete(&self, query: &str, limit: usize) -> Vec<String> {
        let query = normalize_title(query);
        if query.chars().count() < MIN_AUTOCOMPLETE_CHARS {
            return Vec::new();
        }

        let suggestions = self.catalog.filter_by_title_prefix(&query).map(|prefix| {
            prefix
                .take(limit)
                .map(|entry| title_case(&entry.title))
                .collect()
        });

        or_empty(suggestions, "autocomplete")
    }

    pub fn by_genre(&self, genre: &str, limit: usize) -> Vec<MovieRecord> {
        if genre.trim().is_empty() {
            return Vec::new();
        }

        let matches = self
            .catalog
            .filter_by_genre_substring(genre)
            .map(|entries| self.format(entries.take(limit)));

        or_empty(matches, "by_genre")
    }

    /// Random sample standing in for a popularity ranking
    pub fn popular(&self, limit: usize) -> Result<Vec<MovieRecord>, CatalogError> {
        self.popular_with(limit, &mut rand::thread_rng())
    }

    pub fn popular_with<R: Rng + ?Sized>(
        &self,
        limit: usize,
        rng: &mut R,
    ) -> Result<Vec<MovieRecord>, CatalogError> {
        let sample = self.catalog.sample_random_with(limit, rng)?;
        Ok(self.format(sample.into_iter()))
    }

    pub fn list_genres(&self) -> Vec<String> {
        or_empty(self.catalog.distinct_genres(), "list_genres")
    }

    /// Most frequent genre tokens; ties keep first-seen order
    pub fn top_genres(&self, limit: usize) -> Vec<Tally> {
        let tallies = self.catalog.entries().map(|entries| {
            tally(
                entries
                    .iter()
                    .flat_map(CatalogEntry::genre_tokens)
                    .map(|token| (token.to_lowercase(), token)),
                limit,
            )
        });

        or_empty(tallies, "top_genres")
    }

    /// Most frequent directors by exact name; ties keep first-seen order
    pub fn top_directors(&self, limit: usize) -> Vec<Tally> {
        let tallies = self.catalog.entries().map(|entries| {
            tally(
                entries
                    .iter()
                    .filter_map(|entry| entry.director.as_deref())
                    .map(|director| (director.to_string(), director)),
                limit,
            )
        });

        or_empty(tallies, "top_directors")
    }

    pub fn stats_summary(
        &self,
        similarity_dimension: Option<usize>,
    ) -> Result<StatsSummary, CatalogError> {
        let entries = self.catalog.entries()?;

        Ok(StatsSummary {
            total_movies: entries.len(),
            total_genres: self.catalog.distinct_genres()?.len(),
            top_genres: self.top_genres(STATS_TOP_GENRES),
            top_directors: self.top_directors(STATS_TOP_DIRECTORS),
            similarity_dimension,
        })
    }

    fn format<'a>(&self, entries: impl Iterator<Item = &'a CatalogEntry>) -> Vec<MovieRecord> {
        entries
            .map(|entry| MovieRecord::from_entry(entry, &self.poster_base_url))
            .collect()
    }
}

/// Counts occurrences by key, reporting the first display form seen for each
fn tally<'a>(items: impl Iterator<Item = (String, &'a str)>, limit: usize) -> Vec<Tally> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut tallies: Vec<Tally> = Vec::new();

    for (key, display) in items {
        match positions.get(&key) {
            Some(&pos) => tallies[pos].count += 1,
            None => {
                positions.insert(key, tallies.len());
                tallies.push(Tally::new(display, 1));
            }
        }
    }

    // stable: equal counts stay in first-seen order
    tallies.sort_by(|a, b| b.count.cmp(&a.count));
    tallies.truncate(limit);
    tallies
}

fn or_empty<T>(result: Result<Vec<T>, CatalogError>, operation: &'static str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(operation, error = %e, "Catalog read failed, returning no results");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MovieRow;
    use rand::{rngs::StdRng, SeedableRng};

    const BASE: &str = "https://image.tmdb.org/t/p/w500";

    fn service(rows: Vec<MovieRow>) -> BrowseService {
        BrowseService::new(Arc::new(CatalogStore::from_rows(rows)), BASE)
    }

    fn titled(titles: &[&str]) -> BrowseService {
        service(titles.iter().map(|t| MovieRow::titled(t, None)).collect())
    }

    fn directed(director: &str, genres: &str) -> MovieRow {
        MovieRow {
            title: Some(format!("{director} {genres}")),
            director: Some(director.to_string()),
            genres: Some(genres.to_string()),
            ..MovieRow::default()
        }
    }

    fn names(tallies: &[Tally]) -> Vec<(&str, usize)> {
        tallies.iter().map(|t| (t.name.as_str(), t.count)).collect()
    }

    #[test]
    fn test_search_prefix_matches_first() {
        let service = titled(&["the dark knight", "dark city", "into the dark", "darkman"]);
        let titles: Vec<String> = service
            .search_by_title("Dark", 10)
            .into_iter()
            .map(|r| r.title)
            .collect();

        assert_eq!(
            titles,
            vec!["Dark City", "Darkman", "The Dark Knight", "Into The Dark"]
        );
    }

    #[test]
    fn test_search_truncates_to_limit() {
        let service = titled(&["alien", "aliens", "alien 3", "the alien"]);
        let results = service.search_by_title("alien", 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Alien");
    }

    #[test]
    fn test_search_without_matches_is_empty() {
        let service = titled(&["heat"]);
        assert!(service.search_by_title("inception", 20).is_empty());
        assert!(service.search_by_title("  ", 20).is_empty());
    }

    #[test]
    fn test_autocomplete_requires_two_chars() {
        let service = titled(&["alien", "aliens"]);
        assert!(service.autocomplete("a", 10).is_empty());
        assert!(service.autocomplete(" a ", 10).is_empty());
        assert_eq!(service.autocomplete("al", 10), vec!["Alien", "Aliens"]);
    }

    #[test]
    fn test_autocomplete_prefix_only_and_limited() {
        let service = titled(&[
            "abyss", "about time", "absolute power", "the abyss", "abbey road", "abc murders",
        ]);
        let suggestions = service.autocomplete("AB", 5);

        assert_eq!(suggestions.len(), 5);
        assert!(suggestions.iter().all(|s| s.to_lowercase().starts_with("ab")));
        assert!(!suggestions.contains(&"The Abyss".to_string()));
    }

    #[test]
    fn test_by_genre_partial_word_and_limit() {
        let service = service(vec![
            MovieRow::titled("airplane!", Some("Comedy")),
            MovieRow::titled("heat", Some("Crime, Drama")),
            MovieRow::titled("clue", Some("Mystery, comedy")),
            MovieRow::titled("up", Some("Animation, Comedy")),
        ]);

        let results = service.by_genre("com", 2);
        let titles: Vec<&str> = results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Airplane!", "Clue"]);
        assert!(service.by_genre("western", 10).is_empty());
    }

    #[test]
    fn test_popular_samples_without_replacement() {
        let service = titled(&["a", "b", "c", "d"]);
        let mut rng = StdRng::seed_from_u64(5);

        let sample = service.popular_with(3, &mut rng).unwrap();
        let mut titles: Vec<String> = sample.into_iter().map(|r| r.title).collect();
        titles.sort();
        titles.dedup();
        assert_eq!(titles.len(), 3);

        assert_eq!(service.popular(20).unwrap().len(), 4);
    }

    #[test]
    fn test_top_genres_ties_keep_first_seen_order() {
        let service = service(vec![
            directed("Nolan", "Action, Drama"),
            directed("Mann", "drama, Crime"),
            directed("Nolan", "Crime, Action"),
            directed("Villeneuve", "Science Fiction"),
        ]);

        assert_eq!(
            names(&service.top_genres(3)),
            vec![("Action", 2), ("Drama", 2), ("Crime", 2)]
        );
    }

    #[test]
    fn test_top_directors() {
        let service = service(vec![
            directed("Mann", "Crime"),
            directed("Nolan", "Action"),
            directed("Nolan", "Drama"),
            directed("Mann", "Drama"),
            directed("Scott", "Drama"),
            MovieRow::titled("anonymous", None),
        ]);

        assert_eq!(
            names(&service.top_directors(10)),
            vec![("Mann", 2), ("Nolan", 2), ("Scott", 1)]
        );
    }

    #[test]
    fn test_stats_summary() {
        let service = service(vec![
            directed("Mann", "Crime, Drama"),
            directed("Nolan", "Action"),
        ]);

        let stats = service.stats_summary(Some(2)).unwrap();
        assert_eq!(stats.total_movies, 2);
        assert_eq!(stats.total_genres, 3);
        assert_eq!(stats.top_directors.len(), 2);
        assert_eq!(stats.similarity_dimension, Some(2));
    }

    #[test]
    fn test_unavailable_catalog() {
        let service = BrowseService::new(Arc::new(CatalogStore::unavailable()), BASE);

        assert!(service.search_by_title("heat", 10).is_empty());
        assert!(service.autocomplete("he", 10).is_empty());
        assert!(service.by_genre("drama", 10).is_empty());
        assert!(service.list_genres().is_empty());
        assert!(service.top_genres(5).is_empty());
        assert_eq!(service.popular(5).unwrap_err(), CatalogError::Unavailable);
        assert_eq!(service.stats_summary(None).unwrap_err(), CatalogError::Unavailable);
    }
}
