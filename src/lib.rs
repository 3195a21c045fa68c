//! LEXSPACE - Exact Nearest-Neighbor Search over Word Embeddings
//!
//! Loads a pre-trained token -> vector model into an immutable
//! [`EmbeddingSpace`] and answers cosine-similarity top-K queries by full
//! scan, including "most distant" queries that probe with a token's
//! negated vector.

pub mod config;
pub mod error;
pub mod loader;
pub mod vector;

pub use config::Config;
pub use error::{LoadError, SpaceError};
pub use loader::{load_path, Format, LoadOptions};
pub use vector::{negate, EmbeddingSpace, EmbeddingSpaceBuilder, Neighbor};
