//! Flat inner-product index
//!
//! Exact search over every stored vector. With unit-norm inputs the score is
//! cosine similarity.

use ndarray::{Array2, ArrayView1};

use crate::RagError;

#[derive(Debug, Clone)]
pub struct FlatIndex {
    vectors: Array2<f32>,
}

impl FlatIndex {
    pub fn new(dim: usize) -> Self {
        Self {
            vectors: Array2::zeros((0, dim)),
        }
    }

    pub fn dim(&self) -> usize {
        self.vectors.ncols()
    }

    pub fn len(&self) -> usize {
        self.vectors.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append one vector; its position is the previous `len()`
    pub fn add(&mut self, vector: &[f32]) -> Result<(), RagError> {
        self.check_dim(vector.len())?;
        self.vectors
            .push_row(ArrayView1::from(vector))
            .map_err(|e| RagError::Index(e.to_string()))
    }

    pub fn add_batch(&mut self, vectors: &[Vec<f32>]) -> Result<(), RagError> {
        for v in vectors {
            self.add(v)?;
        }
        Ok(())
    }

    /// Top `k` positions by inner product, best first, ties to the lower position
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, RagError> {
        self.check_dim(query.len())?;

        let scores = self.vectors.dot(&ArrayView1::from(query));
        let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(k.min(self.len()));

        Ok(ranked)
    }

    fn check_dim(&self, got: usize) -> Result<(), RagError> {
        if got != self.dim() {
            return Err(RagError::Index(format!(
                "dimension mismatch: index has {}, got {}",
                self.dim(),
                got
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> FlatIndex {
        let mut index = FlatIndex::new(3);
        index
            .add_batch(&[
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
                vec![0.6, 0.8, 0.0],
            ])
            .unwrap();
        index
    }

    #[test]
    fn test_search_orders_by_score() {
        let results = index().search(&[0.0, 1.0, 0.0], 3).unwrap();
        assert_eq!(results[0].0, 1);
        assert!((results[0].1 - 1.0).abs() < 1e-6);
        assert_eq!(results[1].0, 2);
        assert_eq!(results[2].0, 0);
    }

    #[test]
    fn test_ties_prefer_lower_position() {
        let mut index = FlatIndex::new(2);
        index
            .add_batch(&[vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 0.0]])
            .unwrap();

        let results = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(results[0].0, 1);
        assert_eq!(results[1].0, 2);
    }

    #[test]
    fn test_k_is_clamped() {
        let results = index().search(&[1.0, 0.0, 0.0], 10).unwrap();
        assert_eq!(results.len(), 3);

        let results = index().search(&[1.0, 0.0, 0.0], 0).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut index = index();
        assert!(matches!(
            index.search(&[1.0, 0.0], 1),
            Err(RagError::Index(_))
        ));
        assert!(matches!(index.add(&[1.0]), Err(RagError::Index(_))));
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_empty_index_search() {
        let index = FlatIndex::new(4);
        assert!(index.is_empty());
        assert!(index.search(&[0.0; 4], 1).unwrap().is_empty());
    }
}
