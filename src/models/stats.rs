use serde::{Deserialize, Serialize};

/// A name and how many catalog entries carry it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tally {
    pub name: String,
    pub count: usize,
}

impl Tally {
    pub fn new(name: impl Into<String>, count: usize) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// Catalog overview served by `/stats`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatsSummary {
    pub total_movies: usize,
    pub total_genres: usize,
    pub top_genres: Vec<Tally>,
    pub top_directors: Vec<Tally>,
    /// Rows covered by the similarity matrix, if one is loaded
    pub similarity_dimension: Option<usize>,
}
