use serde::{Deserialize, Serialize};

pub mod movie;
pub mod stats;

pub use movie::{title_case, MovieRecord};
pub use stats::{StatsSummary, Tally};

/// Placeholder the dataset uses for a missing genre list
pub const UNKNOWN_GENRE: &str = "Unknown";

/// Normalizes free text the same way stored titles are normalized at load time
pub fn normalize_title(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Raw catalog row as it appears in the movies CSV
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieRow {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Director", default)]
    pub director: Option<String>,
    #[serde(rename = "Cast", default)]
    pub cast: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub genres: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

impl MovieRow {
    /// Convenience constructor for a row carrying only a title and genre list
    pub fn titled(title: &str, genres: Option<&str>) -> Self {
        Self {
            title: Some(title.to_string()),
            genres: genres.map(str::to_string),
            ..Self::default()
        }
    }
}

/// One movie held by the catalog store
///
/// `index` is the row position assigned at load time and the join key into
/// the similarity matrix. `title` is trimmed and lower-cased.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub index: usize,
    pub title: String,
    pub director: Option<String>,
    pub cast: Option<String>,
    pub genres: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
}

impl CatalogEntry {
    pub fn from_row(index: usize, row: MovieRow) -> Self {
        Self {
            index,
            title: row.title.as_deref().map(normalize_title).unwrap_or_default(),
            director: non_blank(row.director),
            cast: non_blank(row.cast),
            genres: non_blank(row.genres),
            overview: non_blank(row.overview),
            poster_path: non_blank(row.poster_path),
        }
    }

    /// Case-insensitive raw substring test against the genre field.
    /// `needle` must already be lower-cased.
    pub fn genre_contains(&self, needle: &str) -> bool {
        self.genres
            .as_deref()
            .is_some_and(|genres| genres.to_lowercase().contains(needle))
    }

    /// Comma-separated genre tokens, trimmed, empties skipped
    pub fn genre_tokens(&self) -> impl Iterator<Item = &str> {
        self.genres
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// First listed genre, unless the field is absent or the "Unknown" placeholder
    pub fn primary_genre(&self) -> Option<&str> {
        let genres = self.genres.as_deref()?;
        if genres.trim() == UNKNOWN_GENRE {
            return None;
        }
        genres
            .split(',')
            .next()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Which resolution strategy produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    Exact,
    Prefix,
    Substring,
    Fuzzy,
}

/// A query resolved to a single catalog entry
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult<'a> {
    pub entry: &'a CatalogEntry,
    pub strategy: MatchStrategy,
}

/// Which path of the recommendation fallback chain produced the results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Similarity,
    GenreFallback,
    RandomFallback,
}

/// Up to ten formatted recommendations for a resolved title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationSet {
    pub query: String,
    pub matched_title: String,
    pub match_strategy: MatchStrategy,
    pub source: RecommendationSource,
    pub results: Vec<MovieRecord>,
}
