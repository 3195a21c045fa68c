//! Vector Module
//!
//! Embedding storage, similarity kernels and exact top-K search.

mod similarity;
mod space;
mod topk;

pub use similarity::{cosine_from_parts, cosine_similarity, dot_product, magnitude, negate};
pub use space::{EmbeddingSpace, EmbeddingSpaceBuilder, Neighbor};
