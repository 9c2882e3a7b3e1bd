use std::cmp::Ordering;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{LoadError, SimilarityError};

/// A ranked column of a similarity row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub score: f32,
}

/// Nearest-neighbor ranking over catalog positions
#[cfg_attr(test, mockall::automock)]
pub trait NeighborRanking: Send + Sync {
    /// Number of catalog positions the ranking covers
    fn dimension(&self) -> usize;

    /// The `n` positions most similar to `index`, best first, never `index` itself
    fn top_neighbors(&self, index: usize, n: usize) -> Result<Vec<Neighbor>, SimilarityError>;
}

/// Dense K×K similarity matrix aligned with catalog positions
///
/// Stored row-major. Immutable once built.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    dimension: usize,
    scores: Vec<f32>,
}

impl SimilarityIndex {
    /// Builds an index from rows, rejecting anything that is not square
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, LoadError> {
        let dimension = rows.len();
        let mut scores = Vec::with_capacity(dimension * dimension);

        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != dimension {
                return Err(LoadError::NotSquare {
                    row,
                    len: values.len(),
                    expected: dimension,
                });
            }
            scores.extend(values);
        }

        Ok(Self { dimension, scores })
    }

    /// Loads a matrix stored as a JSON array of rows
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let rows: Vec<Vec<f32>> = serde_json::from_reader(reader)?;
        Self::from_rows(rows)
    }

    /// Loads the matrix, returning `None` when it cannot be used
    pub fn load_optional(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        match Self::load_json(path) {
            Ok(index) => {
                tracing::info!(
                    path = %path.display(),
                    dimension = index.dimension,
                    "Similarity matrix loaded"
                );
                Some(index)
            }
            Err(e) => {
                tracing::error!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load similarity matrix, recommendations disabled"
                );
                None
            }
        }
    }

    fn row(&self, index: usize) -> &[f32] {
        let start = index * self.dimension;
        &self.scores[start..start + self.dimension]
    }
}

impl NeighborRanking for SimilarityIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn top_neighbors(&self, index: usize, n: usize) -> Result<Vec<Neighbor>, SimilarityError> {
        if index >= self.dimension {
            return Err(SimilarityError::IndexOutOfBounds {
                index,
                dimension: self.dimension,
            });
        }

        let mut ranked: Vec<Neighbor> = self
            .row(index)
            .iter()
            .enumerate()
            .filter(|(column, _)| *column != index)
            .map(|(column, &score)| Neighbor {
                index: column,
                score,
            })
            .collect();

        ranked.sort_by(rank_order);
        ranked.truncate(n);

        Ok(ranked)
    }
}

/// Score descending, then column ascending. NaN scores rank after every
/// real score.
fn rank_order(a: &Neighbor, b: &Neighbor) -> Ordering {
    let by_score = match (a.score.is_nan(), b.score.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal),
    };

    by_score.then(a.index.cmp(&b.index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn indices(neighbors: &[Neighbor]) -> Vec<usize> {
        neighbors.iter().map(|n| n.index).collect()
    }

    fn matrix() -> SimilarityIndex {
        SimilarityIndex::from_rows(vec![
            vec![1.0, 0.2, 0.9, 0.5, 0.9],
            vec![0.2, 1.0, 0.1, 0.3, 0.4],
            vec![0.9, 0.1, 1.0, 0.7, 0.6],
            vec![0.5, 0.3, 0.7, 1.0, 0.2],
            vec![0.9, 0.4, 0.6, 0.2, 1.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_top_neighbors_sorted_descending_excluding_self() {
        let neighbors = matrix().top_neighbors(2, 3).unwrap();
        assert_eq!(indices(&neighbors), vec![0, 3, 4]);
        assert!(neighbors.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_ties_break_by_ascending_column() {
        let neighbors = matrix().top_neighbors(0, 4).unwrap();
        assert_eq!(indices(&neighbors), vec![2, 4, 3, 1]);
    }

    #[test]
    fn test_self_excluded_even_when_not_highest() {
        let index = SimilarityIndex::from_rows(vec![
            vec![0.1, 0.9, 0.8],
            vec![0.9, 0.1, 0.8],
            vec![0.5, 0.5, 0.5],
        ])
        .unwrap();

        let neighbors = index.top_neighbors(0, 10).unwrap();
        assert_eq!(indices(&neighbors), vec![1, 2]);
    }

    #[test]
    fn test_returns_at_most_n() {
        let index = matrix();
        for n in 0..8 {
            let neighbors = index.top_neighbors(1, n).unwrap();
            assert!(neighbors.len() <= n);
            assert!(neighbors.iter().all(|nb| nb.index != 1));
        }
    }

    #[test]
    fn test_out_of_bounds() {
        let err = matrix().top_neighbors(5, 10).unwrap_err();
        assert_eq!(
            err,
            SimilarityError::IndexOutOfBounds {
                index: 5,
                dimension: 5
            }
        );
    }

    #[test]
    fn test_nan_sorts_last() {
        let index = SimilarityIndex::from_rows(vec![
            vec![1.0, f32::NAN, 0.1, 0.5],
            vec![0.0; 4],
            vec![0.0; 4],
            vec![0.0; 4],
        ])
        .unwrap();

        let neighbors = index.top_neighbors(0, 3).unwrap();
        assert_eq!(indices(&neighbors), vec![3, 2, 1]);
    }

    #[test]
    fn test_from_rows_rejects_ragged_matrix() {
        let err = SimilarityIndex::from_rows(vec![vec![1.0, 0.5], vec![0.5]]).unwrap_err();
        assert!(matches!(
            err,
            LoadError::NotSquare {
                row: 1,
                len: 1,
                expected: 2
            }
        ));
    }

    #[test]
    fn test_from_reader_json() {
        let json = "[[1.0, 0.25], [0.25, 1.0]]";
        let index = SimilarityIndex::from_reader(json.as_bytes()).unwrap();
        assert_eq!(index.dimension(), 2);
        assert_eq!(index.top_neighbors(1, 5).unwrap(), vec![Neighbor { index: 0, score: 0.25 }]);
    }

    #[test]
    fn test_load_optional_missing_file() {
        assert!(SimilarityIndex::load_optional("/nonexistent/matrix.json").is_none());
    }
}
