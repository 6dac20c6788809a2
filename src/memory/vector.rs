//! Embedding and similarity backends
//!
//! - `FastEmbedder`: local sentence encoder (AllMiniLM-L6-v2 via fastembed)
//! - `FlatIpIndex`: exhaustive inner-product index. With L2-normalised
//!   vectors the inner product is the cosine similarity.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use rayon::prelude::*;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{Embedder, Neighbor, VectorIndex};

pub struct FastEmbedder {
    model: Mutex<TextEmbedding>,
}

impl FastEmbedder {
    pub fn new() -> Result<Self> {
        info!("Loading sentence embedding model (AllMiniLM-L6-v2)...");
        let model = TextEmbedding::try_new(InitOptions::new(EmbeddingModel::AllMiniLML6V2))
            .context("Failed to initialize embedding model")?;
        Ok(Self {
            model: Mutex::new(model),
        })
    }
}

#[async_trait]
impl Embedder for FastEmbedder {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let mut model = self.model.lock().await;
        let embeddings = model.embed(texts, None).context("Embedding failed")?;
        Ok(embeddings)
    }
}

/// Scale `vec` to unit length in place. Zero vectors are left untouched.
pub fn normalize(vec: &mut [f32]) {
    let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vec.iter_mut() {
            *x /= norm;
        }
    }
}

fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Brute-force inner-product index
pub struct FlatIpIndex {
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

impl FlatIpIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }
}

impl VectorIndex for FlatIpIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.vectors.len()
    }

    fn add(&mut self, vectors: Vec<Vec<f32>>) -> Result<()> {
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimension) {
            bail!(
                "Vector dimension mismatch: index is {}, got {}",
                self.dimension,
                bad.len()
            );
        }
        self.vectors.extend(vectors);
        debug!("Index holds {} vectors of dimension {}", self.vectors.len(), self.dimension);
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Vec<Neighbor> {
        if k == 0 || query.len() != self.dimension {
            return Vec::new();
        }

        let mut scored: Vec<Neighbor> = self
            .vectors
            .par_iter()
            .enumerate()
            .map(|(position, v)| Neighbor {
                position,
                score: dot_product(query, v),
            })
            .collect();

        // Stable sort: equal scores keep insertion order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_unit_length() {
        let mut v = vec![3.0, 4.0];
        normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let mut index = FlatIpIndex::new(2);
        index
            .add(vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.6, 0.8]])
            .unwrap();

        let hits = index.search(&[0.0, 1.0], 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].position, 1);
        assert_eq!(hits[1].position, 2);
        assert!(hits[0].score >= hits[1].score);
    }

    #[test]
    fn test_search_k_larger_than_index() {
        let mut index = FlatIpIndex::new(2);
        index.add(vec![vec![1.0, 0.0]]).unwrap();
        let hits = index.search(&[1.0, 0.0], 10);
        assert_eq!(hits.len(), 1);
        assert!(hits.iter().all(|h| h.position < index.len()));
    }

    #[test]
    fn test_add_rejects_wrong_dimension() {
        let mut index = FlatIpIndex::new(3);
        assert!(index.add(vec![vec![1.0, 0.0]]).is_err());
        assert!(index.is_empty());
    }

    #[test]
    fn test_search_with_wrong_query_dimension_is_empty() {
        let mut index = FlatIpIndex::new(2);
        index.add(vec![vec![1.0, 0.0]]).unwrap();
        assert!(index.search(&[1.0, 0.0, 0.0], 1).is_empty());
    }
}
