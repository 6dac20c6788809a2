//! Case Study Memory
//!
//! Static corpus of reference case studies, plus the two seams used to
//! rank them against a brief: an [`Embedder`] turning text into vectors
//! and a [`VectorIndex`] answering nearest-neighbour queries.

pub mod entry;
pub mod vector;

pub use entry::{load_case_studies, CaseStudy, ScoredCaseStudy};
pub use vector::{normalize, FastEmbedder, FlatIpIndex};

use anyhow::Result;
use async_trait::async_trait;

/// Text encoder producing fixed-length vectors
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Encode a batch of texts. One vector per input, in input order.
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;
}

/// A single nearest-neighbour hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the vector in insertion order
    pub position: usize,
    pub score: f32,
}

/// Similarity index over corpus vectors
pub trait VectorIndex: Send + Sync {
    fn dimension(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append vectors; positions continue from the current length.
    fn add(&mut self, vectors: Vec<Vec<f32>>) -> Result<()>;

    /// Up to `k` best hits, best first.
    fn search(&self, query: &[f32], k: usize) -> Vec<Neighbor>;
}
