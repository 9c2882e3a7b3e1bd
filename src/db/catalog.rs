use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use rand::Rng;

use crate::{
    error::{CatalogError, LoadError},
    models::{normalize_title, CatalogEntry, MovieRow},
};

/// In-memory, read-only movie catalog
///
/// Built once at startup and shared by reference. An empty store means the
/// dataset failed to load; every accessor reports that as
/// [`CatalogError::Unavailable`] rather than as an empty result.
#[derive(Debug, Default)]
pub struct CatalogStore {
    entries: Vec<CatalogEntry>,
}

impl CatalogStore {
    /// Builds a store from rows, assigning positions in iteration order
    pub fn from_rows(rows: impl IntoIterator<Item = MovieRow>) -> Self {
        let entries = rows
            .into_iter()
            .enumerate()
            .map(|(index, row)| CatalogEntry::from_row(index, row))
            .collect();

        Self { entries }
    }

    /// A store whose dataset could not be loaded
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Loads the catalog from a CSV file
    pub fn load_csv(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Loads the catalog from CSV data. The `Title` column is required;
    /// any malformed row fails the whole load since row positions are the
    /// join key into the similarity matrix.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let mut reader = csv::Reader::from_reader(reader);

        if !reader.headers()?.iter().any(|h| h == "Title") {
            return Err(LoadError::MissingColumn("Title"));
        }

        let rows = reader
            .deserialize::<MovieRow>()
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_rows(rows))
    }

    /// Loads the catalog, degrading to an unavailable store on failure
    pub fn load_or_unavailable(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load_csv(path) {
            Ok(store) => {
                tracing::info!(
                    path = %path.display(),
                    movies = store.len(),
                    "Catalog loaded"
                );
                store
            }
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load catalog, serving without a dataset"
                );
                Self::unavailable()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_available(&self) -> bool {
        !self.entries.is_empty()
    }

    /// All entries in catalog order
    pub fn entries(&self) -> Result<&[CatalogEntry], CatalogError> {
        if self.entries.is_empty() {
            return Err(CatalogError::Unavailable);
        }
        Ok(&self.entries)
    }

    pub fn lookup_by_index(&self, index: usize) -> Result<&CatalogEntry, CatalogError> {
        self.entries()?
            .get(index)
            .ok_or(CatalogError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            })
    }

    /// Entries whose title starts with `prefix`, in catalog order
    pub fn filter_by_title_prefix<'a>(
        &'a self,
        prefix: &str,
    ) -> Result<impl Iterator<Item = &'a CatalogEntry> + 'a, CatalogError> {
        let prefix = normalize_title(prefix);
        Ok(self
            .entries()?
            .iter()
            .filter(move |entry| !entry.title.is_empty() && entry.title.starts_with(&prefix)))
    }

    /// Entries whose title contains `needle` anywhere, in catalog order
    pub fn filter_by_title_substring<'a>(
        &'a self,
        needle: &str,
    ) -> Result<impl Iterator<Item = &'a CatalogEntry> + 'a, CatalogError> {
        let needle = normalize_title(needle);
        Ok(self
            .entries()?
            .iter()
            .filter(move |entry| !entry.title.is_empty() && entry.title.contains(&needle)))
    }

    /// Entries whose raw genre field contains `genre`, case-insensitively.
    /// Partial words match: "com" selects "Comedy".
    pub fn filter_by_genre_substring<'a>(
        &'a self,
        genre: &str,
    ) -> Result<impl Iterator<Item = &'a CatalogEntry> + 'a, CatalogError> {
        let genre = genre.trim().to_lowercase();
        Ok(self
            .entries()?
            .iter()
            .filter(move |entry| entry.genre_contains(&genre)))
    }

    /// Distinct genre tokens, sorted ascending
    ///
    /// Tokens that differ only by case are the same genre; the spelling first
    /// seen in catalog order is the one reported.
    pub fn distinct_genres(&self) -> Result<Vec<String>, CatalogError> {
        let mut genres: BTreeMap<String, &str> = BTreeMap::new();

        for token in self.entries()?.iter().flat_map(CatalogEntry::genre_tokens) {
            genres.entry(token.to_lowercase()).or_insert(token);
        }

        Ok(genres.into_values().map(str::to_string).collect())
    }

    /// `k` distinct entries chosen uniformly at random; all entries when `k`
    /// exceeds the catalog size
    pub fn sample_random(&self, k: usize) -> Result<Vec<&CatalogEntry>, CatalogError> {
        self.sample_random_with(k, &mut rand::thread_rng())
    }

    pub fn sample_random_with<R: Rng + ?Sized>(
        &self,
        k: usize,
        rng: &mut R,
    ) -> Result<Vec<&CatalogEntry>, CatalogError> {
        let entries = self.entries()?;
        let amount = k.min(entries.len());

        Ok(rand::seq::index::sample(rng, entries.len(), amount)
            .into_iter()
            .map(|i| &entries[i])
            .collect())
    }

    /// Like [`Self::sample_random_with`] but never returns the entry at `exclude`
    pub fn sample_random_excluding<R: Rng + ?Sized>(
        &self,
        k: usize,
        exclude: usize,
        rng: &mut R,
    ) -> Result<Vec<&CatalogEntry>, CatalogError> {
        let entries = self.entries()?;
        if exclude >= entries.len() {
            return self.sample_random_with(k, rng);
        }

        let pool = entries.len() - 1;
        let amount = k.min(pool);

        // Sample over the positions with `exclude` removed, then shift back
        Ok(rand::seq::index::sample(rng, pool, amount)
            .into_iter()
            .map(|i| if i >= exclude { i + 1 } else { i })
            .map(|i| &entries[i])
            .collect())
    }
}
