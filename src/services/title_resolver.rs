use crate::{
    db::CatalogStore,
    error::TitleNotFound,
    models::{normalize_title, CatalogEntry, MatchResult, MatchStrategy},
};

/// Resolves free text to a single catalog entry
///
/// Strategies run in order and the first one with any candidate wins:
/// 1. exact title
/// 2. title prefix
/// 3. title substring
/// 4. fuzzy: punctuation stripped from both sides, then containment either way
///
/// Within a strategy the first candidate in catalog order is chosen, so
/// duplicate titles always resolve to the earliest row.
#[derive(Debug, Clone, Copy)]
pub struct TitleResolver<'a> {
    catalog: &'a CatalogStore,
}

impl<'a> TitleResolver<'a> {
    pub fn new(catalog: &'a CatalogStore) -> Self {
        Self { catalog }
    }

    pub fn resolve(&self, query: &str) -> Result<MatchResult<'a>, TitleNotFound> {
        let normalized = normalize_title(query);
        let not_found = || TitleNotFound {
            query: query.trim().to_string(),
        };

        if normalized.is_empty() {
            return Err(not_found());
        }

        let Ok(entries) = self.catalog.entries() else {
            tracing::warn!(query = %query, "Title resolution attempted without a catalog");
            return Err(not_found());
        };

        let matched = first_match(entries, MatchStrategy::Exact, |title| title == normalized)
            .or_else(|| {
                first_match(entries, MatchStrategy::Prefix, |title| {
                    title.starts_with(&normalized)
                })
            })
            .or_else(|| {
                first_match(entries, MatchStrategy::Substring, |title| {
                    title.contains(&normalized)
                })
            })
            .or_else(|| fuzzy_match(entries, &normalized));

        match matched {
            Some(result) => {
                tracing::info!(
                    query = %query,
                    matched = %result.entry.title,
                    index = result.entry.index,
                    strategy = ?result.strategy,
                    "Title resolved"
                );
                Ok(result)
            }
            None => {
                tracing::info!(query = %query, "No title matched after all strategies");
                Err(not_found())
            }
        }
    }
}

fn first_match<'a>(
    entries: &'a [CatalogEntry],
    strategy: MatchStrategy,
    predicate: impl Fn(&str) -> bool,
) -> Option<MatchResult<'a>> {
    entries
        .iter()
        .find(|entry| !entry.title.is_empty() && predicate(&entry.title))
        .map(|entry| MatchResult { entry, strategy })
}

// Scans the whole catalog in order and takes the first hit, not the closest one.
fn fuzzy_match<'a>(entries: &'a [CatalogEntry], normalized: &str) -> Option<MatchResult<'a>> {
    let query = strip_punctuation(normalized);
    if query.is_empty() {
        return None;
    }

    entries
        .iter()
        .find(|entry| {
            let title = strip_punctuation(&entry.title);
            !title.is_empty() && (title.contains(&query) || query.contains(&title))
        })
        .map(|entry| MatchResult {
            entry,
            strategy: MatchStrategy::Fuzzy,
        })
}

/// Keeps word characters and whitespace, then trims
fn strip_punctuation(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_')
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MovieRow;

    fn catalog(titles: &[&str]) -> CatalogStore {
        CatalogStore::from_rows(titles.iter().map(|t| MovieRow::titled(t, None)))
    }

    fn resolve(catalog: &CatalogStore, query: &str) -> Option<(usize, MatchStrategy)> {
        TitleResolver::new(catalog)
            .resolve(query)
            .ok()
            .map(|m| (m.entry.index, m.strategy))
    }

    #[test]
    fn test_exact_preferred_over_prefix() {
        let catalog = catalog(&["alien resurrection", "alien", "aliens"]);
        assert_eq!(resolve(&catalog, "Alien"), Some((1, MatchStrategy::Exact)));
    }

    #[test]
    fn test_duplicate_titles_resolve_to_first_row() {
        let catalog = catalog(&["heat", "solaris", "Solaris"]);
        assert_eq!(resolve(&catalog, "solaris"), Some((1, MatchStrategy::Exact)));
    }

    #[test]
    fn test_prefix_match() {
        let catalog = catalog(&["the godfather", "the godfather part ii"]);
        assert_eq!(resolve(&catalog, "  THE GOD "), Some((0, MatchStrategy::Prefix)));
    }

    #[test]
    fn test_substring_when_no_prefix() {
        let catalog = catalog(&["the matrix", "the matrix reloaded"]);
        assert_eq!(resolve(&catalog, "Matrix"), Some((0, MatchStrategy::Substring)));
    }

    #[test]
    fn test_fuzzy_strips_punctuation() {
        let catalog = catalog(&["heat", "spider-man: no way home"]);
        assert_eq!(
            resolve(&catalog, "spider-man no way home"),
            Some((1, MatchStrategy::Fuzzy))
        );
    }

    #[test]
    fn test_fuzzy_accepts_title_inside_query() {
        let catalog = catalog(&["amélie", "up!"]);
        assert_eq!(
            resolve(&catalog, "watch up tonight"),
            Some((1, MatchStrategy::Fuzzy))
        );
    }

    #[test]
    fn test_prefix_beats_earlier_substring() {
        let catalog = catalog(&["the dark knight", "dark city"]);
        assert_eq!(resolve(&catalog, "dark"), Some((1, MatchStrategy::Prefix)));
    }

    #[test]
    fn test_substring_beats_earlier_fuzzy() {
        // "trix" is only a fuzzy hit: the query contains it
        let catalog = catalog(&["trix", "the matrix"]);
        assert_eq!(
            resolve(&catalog, "matrix"),
            Some((1, MatchStrategy::Substring))
        );
    }

    #[test]
    fn test_not_found() {
        let catalog = catalog(&["the matrix", "heat"]);
        let err = TitleResolver::new(&catalog).resolve(" Inception ").unwrap_err();
        assert_eq!(err.query, "Inception");
    }

    #[test]
    fn test_blank_query_not_found() {
        let catalog = catalog(&["heat"]);
        assert_eq!(resolve(&catalog, "   "), None);
        assert_eq!(resolve(&catalog, "!!"), None);
    }

    #[test]
    fn test_unavailable_catalog_not_found() {
        let catalog = CatalogStore::unavailable();
        assert_eq!(resolve(&catalog, "heat"), None);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let catalog = catalog(&["the matrix", "the matrix reloaded", "heat"]);
        let first = resolve(&catalog, "reloaded");
        assert_eq!(first, Some((1, MatchStrategy::Substring)));
        assert_eq!(resolve(&catalog, "reloaded"), first);
    }
}
