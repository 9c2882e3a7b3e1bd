use serde::{Deserialize, Serialize};

use super::CatalogEntry;

const UNKNOWN: &str = "Unknown";
const NO_OVERVIEW: &str = "No overview available";

/// A catalog entry formatted for display
///
/// Field names follow the column names the frontend already consumes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Director")]
    pub director: String,
    #[serde(rename = "Cast")]
    pub cast: String,
    pub poster_path: String,
    pub genres: String,
    pub overview: String,
}

impl MovieRecord {
    /// Title-cases the title, prefixes the poster path with `poster_base`
    /// and substitutes placeholders for missing fields
    pub fn from_entry(entry: &CatalogEntry, poster_base: &str) -> Self {
        Self {
            title: title_case(&entry.title),
            director: entry.director.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            cast: entry.cast.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            poster_path: format!(
                "{}{}",
                poster_base,
                entry.poster_path.as_deref().unwrap_or_default()
            ),
            genres: entry.genres.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            overview: entry
                .overview
                .clone()
                .unwrap_or_else(|| NO_OVERVIEW.to_string()),
        }
    }
}

/// Upper-cases the first letter of every word and lower-cases the rest.
/// Words are separated by whitespace or hyphens.
pub fn title_case(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut at_word_start = true;

    for c in title.chars() {
        if c.is_whitespace() || c == '-' {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            out.extend(c.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }

    out
}
