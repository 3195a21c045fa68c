//! Embedding Space
//!
//! Immutable token -> vector mapping with exact cosine top-K search.

use std::ops::Range;

use hashbrown::HashMap;
use tracing::debug;

use super::similarity::{cosine_from_parts, dot_product, magnitude};
use super::topk::{Candidate, TopK};
use crate::error::{Result, SpaceError};

/// Upper bound on entries reserved up front; larger vocabularies grow on push
const MAX_PREALLOC_ENTRIES: usize = 1 << 20;

/// Upper bound on matrix components reserved up front
const MAX_PREALLOC_COMPONENTS: usize = 1 << 24;

/// One entry of a query result
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    /// Vocabulary token
    pub token: String,
    /// Cosine similarity to the probe, in `[-1, 1]`
    pub score: f32,
}

/// Collects entries before publishing a read-only [`EmbeddingSpace`]
#[derive(Debug, Clone)]
pub struct EmbeddingSpaceBuilder {
    dimension: usize,
    tokens: Vec<String>,
    index: HashMap<String, usize>,
    data: Vec<f32>,
}

impl EmbeddingSpaceBuilder {
    /// Create a builder for vectors of `dimension` components
    pub fn new(dimension: usize) -> Self {
        Self::with_capacity(dimension, 0)
    }

    /// Create a builder with room for `entries` vectors
    ///
    /// The reservation is capped, so an untrusted entry count cannot
    /// exhaust memory before any data arrives.
    pub fn with_capacity(dimension: usize, entries: usize) -> Self {
        let entries = entries.min(MAX_PREALLOC_ENTRIES);
        Self {
            dimension,
            tokens: Vec::with_capacity(entries),
            index: HashMap::with_capacity(entries),
            data: Vec::with_capacity(
                entries
                    .saturating_mul(dimension)
                    .min(MAX_PREALLOC_COMPONENTS),
            ),
        }
    }

    /// Expected embedding dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of entries pushed so far
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Check if a token was already pushed
    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    /// Append a vocabulary entry
    pub fn push(&mut self, token: impl Into<String>, vector: &[f32]) -> Result<()> {
        let token = token.into();
        if vector.len() != self.dimension {
            return Err(SpaceError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(SpaceError::NonFinite { token });
        }
        if self.index.contains_key(&token) {
            return Err(SpaceError::DuplicateToken { token });
        }

        self.index.insert(token.clone(), self.tokens.len());
        self.tokens.push(token);
        self.data.extend_from_slice(vector);
        Ok(())
    }

    /// Publish the read-only space
    pub fn build(self) -> Result<EmbeddingSpace> {
        if self.dimension == 0 {
            return Err(SpaceError::ZeroDimension);
        }

        let norms = self.data.chunks_exact(self.dimension).map(magnitude).collect();

        Ok(EmbeddingSpace {
            dimension: self.dimension,
            tokens: self.tokens,
            index: self.index,
            data: self.data,
            norms,
        })
    }
}

/// Read-only vocabulary of fixed-dimension vectors
///
/// Rows are stored contiguously in insertion order. The space holds no
/// interior mutability, so a shared reference (or an `Arc`) can be queried
/// from any number of threads at once.
#[derive(Debug, Clone)]
pub struct EmbeddingSpace {
    dimension: usize,
    tokens: Vec<String>,
    index: HashMap<String, usize>,
    /// Row-major `len x dimension` matrix
    data: Vec<f32>,
    /// L2 norm of each row
    norms: Vec<f32>,
}

impl EmbeddingSpace {
    /// Build a space from `(token, vector)` pairs
    pub fn from_entries<I, T, V>(dimension: usize, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (T, V)>,
        T: Into<String>,
        V: AsRef<[f32]>,
    {
        let mut builder = EmbeddingSpaceBuilder::new(dimension);
        for (token, vector) in entries {
            builder.push(token, vector.as_ref())?;
        }
        builder.build()
    }

    /// Get embedding dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Get vocabulary size
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Vocabulary in insertion order
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Check if token exists
    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    /// Vocabulary position of a token
    pub fn position(&self, token: &str) -> Option<usize> {
        self.index.get(token).copied()
    }

    /// Get the vector for a token
    pub fn vector_of(&self, token: &str) -> Result<&[f32]> {
        self.position(token)
            .map(|pos| self.row(pos))
            .ok_or_else(|| SpaceError::NotFound {
                token: token.to_string(),
            })
    }

    /// Find the `k` entries most similar to `probe` by cosine similarity
    ///
    /// Exact full scan. Ties keep vocabulary order.
    pub fn most_similar(&self, probe: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.search(probe, k, None)
    }

    /// Same result as [`most_similar`](Self::most_similar), scored on
    /// `shards` scoped threads (0 = one per CPU)
    pub fn most_similar_parallel(
        &self,
        probe: &[f32],
        k: usize,
        shards: usize,
    ) -> Result<Vec<Neighbor>> {
        self.validate_probe(probe, k)?;

        let shards = match shards {
            0 => num_cpus::get(),
            n => n,
        }
        .clamp(1, self.len().max(1));

        if shards == 1 {
            return self.search(probe, k, None);
        }

        let probe_norm = magnitude(probe);
        let chunk = self.len().div_ceil(shards);
        debug!(shards, chunk, k, "sharded similarity scan");

        let partials: Vec<TopK> = crossbeam::scope(|scope| {
            let handles: Vec<_> = (0..shards)
                .map(|i| {
                    let start = (i * chunk).min(self.len());
                    let end = ((i + 1) * chunk).min(self.len());
                    scope.spawn(move |_| self.scan(start..end, probe, probe_norm, k, None))
                })
                .collect();

            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect::<Vec<_>>()
        })
        .unwrap_or_else(|e| std::panic::resume_unwind(e));

        let mut merged = TopK::new(k);
        for partial in partials {
            merged.merge(partial);
        }
        Ok(self.resolve(merged))
    }

    /// Entries closest to the negation of the token's vector
    pub fn most_distant(&self, token: &str, k: usize) -> Result<Vec<Neighbor>> {
        let probe = super::negate(self.vector_of(token)?);
        self.most_similar(&probe, k)
    }

    /// Nearest neighbors of a token, excluding the token itself
    pub fn similar_to_token(&self, token: &str, k: usize) -> Result<Vec<Neighbor>> {
        let pos = self.position(token).ok_or_else(|| SpaceError::NotFound {
            token: token.to_string(),
        })?;
        self.search(self.row(pos), k, Some(pos))
    }

    fn row(&self, pos: usize) -> &[f32] {
        let start = pos * self.dimension;
        &self.data[start..start + self.dimension]
    }

    fn validate_probe(&self, probe: &[f32], k: usize) -> Result<()> {
        if probe.len() != self.dimension {
            return Err(SpaceError::DimensionMismatch {
                expected: self.dimension,
                actual: probe.len(),
            });
        }
        if k == 0 {
            return Err(SpaceError::ZeroK);
        }
        if probe.iter().any(|x| !x.is_finite()) {
            return Err(SpaceError::NonFinite {
                token: "<probe>".to_string(),
            });
        }
        Ok(())
    }

    fn search(&self, probe: &[f32], k: usize, skip: Option<usize>) -> Result<Vec<Neighbor>> {
        self.validate_probe(probe, k)?;
        let top = self.scan(0..self.len(), probe, magnitude(probe), k, skip);
        debug!(vocabulary = self.len(), k, hits = top.len(), "similarity scan");
        Ok(self.resolve(top))
    }

    fn scan(
        &self,
        rows: Range<usize>,
        probe: &[f32],
        probe_norm: f32,
        k: usize,
        skip: Option<usize>,
    ) -> TopK {
        let mut top = TopK::new(k);
        for pos in rows {
            if skip == Some(pos) {
                continue;
            }
            let dot = dot_product(self.row(pos), probe);
            let score = cosine_from_parts(dot, self.norms[pos], probe_norm);
            top.push(Candidate::new(score, pos));
        }
        top
    }

    fn resolve(&self, top: TopK) -> Vec<Neighbor> {
        top.into_sorted_vec()
            .into_iter()
            .map(|c| Neighbor {
                token: self.tokens[c.position].clone(),
                score: c.score,
            })
            .collect()
    }
}
