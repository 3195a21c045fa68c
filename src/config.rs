//! Query Configuration

use std::path::PathBuf;

use crate::loader::{Format, LoadOptions};

/// Runtime configuration for loading a model and running queries
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the pre-trained embedding artifact
    pub model_path: PathBuf,

    /// Artifact layout
    pub format: Format,

    /// Read at most this many leading vocabulary entries
    pub limit: Option<usize>,

    /// Number of neighbors to return
    pub top_n: usize,

    /// Scan shards per query (0 = one per CPU, 1 = sequential)
    pub shards: usize,

    /// Replace invalid UTF-8 in tokens instead of failing the load
    pub lossy_utf8: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("GoogleNews-vectors-negative300.bin"),
            format: Format::Auto,
            limit: None,
            top_n: 10,
            shards: 1,
            lossy_utf8: false,
        }
    }
}

impl Config {
    /// Set the model path
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    /// Set the artifact layout
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Limit how many entries are loaded
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Set how many neighbors a query returns
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Set scan shard count
    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    pub fn with_lossy_utf8(mut self, lossy: bool) -> Self {
        self.lossy_utf8 = lossy;
        self
    }

    /// Loader options derived from this config
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            format: self.format,
            limit: self.limit,
            lossy_utf8: self.lossy_utf8,
        }
    }
}
