//! Embedding Artifact Loader
//!
//! Reads pre-trained vectors in the word2vec text and binary layouts.

mod binary;
mod text;

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use tracing::{info, warn};

use crate::error::LoadError;
use crate::vector::{EmbeddingSpace, EmbeddingSpaceBuilder};

pub use binary::read_binary;
pub use text::read_text;

/// Read buffer for model files, which are often several gigabytes
const READ_BUFFER_SIZE: usize = 1 << 20;

/// On-disk layout of an embedding artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// `.bin` files are binary, everything else text
    #[default]
    Auto,
    Text,
    Binary,
}

impl Format {
    /// Resolve `Auto` from the file extension
    pub fn resolve(self, path: &Path) -> Format {
        match self {
            Format::Auto => {
                let is_bin = path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("bin"))
                    .unwrap_or(false);
                if is_bin {
                    Format::Binary
                } else {
                    Format::Text
                }
            }
            other => other,
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Format::Auto),
            "text" | "txt" => Ok(Format::Text),
            "binary" | "bin" => Ok(Format::Binary),
            other => Err(format!(
                "unknown format '{}', expected auto, text or binary",
                other
            )),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Auto => write!(f, "auto"),
            Format::Text => write!(f, "text"),
            Format::Binary => write!(f, "binary"),
        }
    }
}

/// Options controlling how an artifact is read
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// File layout
    pub format: Format,
    /// Read at most this many leading entries
    pub limit: Option<usize>,
    /// Replace invalid UTF-8 in tokens instead of failing
    pub lossy_utf8: bool,
}

impl LoadOptions {
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_lossy_utf8(mut self, lossy: bool) -> Self {
        self.lossy_utf8 = lossy;
        self
    }
}

/// Load an embedding space from a file
pub fn load_path(path: impl AsRef<Path>, options: &LoadOptions) -> Result<EmbeddingSpace, LoadError> {
    let path = path.as_ref();
    let format = options.format.resolve(path);
    let started = Instant::now();

    let file = File::open(path)?;
    let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);

    let space = match format {
        Format::Binary => read_binary(reader, options)?,
        _ => read_text(reader, options)?,
    };

    info!(
        path = %path.display(),
        %format,
        entries = space.len(),
        dimension = space.dimension(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Loaded embedding space"
    );

    Ok(space)
}

/// Decode token bytes according to the UTF-8 policy
fn decode_token(raw: &[u8], entry: usize, lossy: bool) -> Result<String, LoadError> {
    if lossy {
        Ok(String::from_utf8_lossy(raw).into_owned())
    } else {
        std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|_| LoadError::InvalidUtf8 { entry })
    }
}

/// Push an entry, keeping the first occurrence of a repeated token
fn push_entry(
    builder: &mut EmbeddingSpaceBuilder,
    token: String,
    vector: &[f32],
    entry: usize,
) -> Result<(), LoadError> {
    if builder.contains(&token) {
        warn!(%token, entry, "Duplicate token, keeping first occurrence");
        return Ok(());
    }
    builder.push(token, vector)?;
    Ok(())
}

/// Parse a `"<count> <dim>"` header
fn parse_header(line: &str) -> Option<(usize, usize)> {
    let mut fields = line.split_whitespace();
    let count = fields.next()?.parse().ok()?;
    let dim = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some((count, dim))
}
