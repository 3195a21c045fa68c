//! Error Types
//!
//! Query-time and load-time failures.

use std::io;

use thiserror::Error;

/// Errors raised by the embedding space and its builder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpaceError {
    /// Token is not part of the vocabulary
    #[error("token '{token}' not found in the vocabulary")]
    NotFound { token: String },

    /// Vector length differs from the space dimension
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Token was pushed twice into the builder
    #[error("duplicate token '{token}'")]
    DuplicateToken { token: String },

    /// Vector contains NaN or infinity
    #[error("vector for '{token}' has a non-finite component")]
    NonFinite { token: String },

    /// Space was declared with zero components per vector
    #[error("embedding dimension must be at least 1")]
    ZeroDimension,

    /// Top-K query asked for zero results
    #[error("k must be at least 1")]
    ZeroK,
}

/// Errors raised while reading a pre-trained embedding artifact
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Input does not follow the expected layout
    #[error("malformed input at {location}: {reason}")]
    Malformed { location: String, reason: String },

    /// Token bytes are not valid UTF-8
    #[error("token at entry {entry} is not valid UTF-8")]
    InvalidUtf8 { entry: usize },

    #[error(transparent)]
    Space(#[from] SpaceError),
}

impl LoadError {
    pub(crate) fn malformed(location: impl Into<String>, reason: impl Into<String>) -> Self {
        LoadError::Malformed {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SpaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_token() {
        let err = SpaceError::NotFound {
            token: "russian".to_string(),
        };
        assert_eq!(err.to_string(), "token 'russian' not found in the vocabulary");

        let err = SpaceError::DimensionMismatch {
            expected: 300,
            actual: 2,
        };
        assert_eq!(err.to_string(), "dimension mismatch: expected 300, got 2");
    }

    #[test]
    fn test_load_error_wraps_space_error() {
        let err: LoadError = SpaceError::ZeroDimension.into();
        assert!(matches!(err, LoadError::Space(SpaceError::ZeroDimension)));
        assert_eq!(err.to_string(), "embedding dimension must be at least 1");

        let err = LoadError::malformed("line 3", "missing token");
        assert_eq!(err.to_string(), "malformed input at line 3: missing token");
    }
}
