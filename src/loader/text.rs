//! word2vec / GloVe text layout
//!
//! Optional `"<count> <dim>"` header, then one `token v1 .. vD` per line.
//! Without a header the dimension comes from the first entry. A first line
//! of two integers is read as a header unless the next entry has a single
//! component, in which case it is the first entry of a 1-dimensional file.

use std::io::BufRead;

use tracing::debug;

use super::{decode_token, parse_header, push_entry, LoadOptions};
use crate::error::LoadError;
use crate::vector::{EmbeddingSpace, EmbeddingSpaceBuilder};

/// Read a text artifact into an embedding space
pub fn read_text<R: BufRead>(mut reader: R, options: &LoadOptions) -> Result<EmbeddingSpace, LoadError> {
    let limit = options.limit.unwrap_or(usize::MAX);
    let mut builder: Option<EmbeddingSpaceBuilder> = None;
    let mut expected: Option<usize> = None;
    // First line as an entry, in case the header reading turns out wrong
    let mut header_entry: Option<(String, f32)> = None;
    let mut entries = 0usize;
    let mut line_no = 0usize;
    let mut raw = Vec::new();
    let mut values = Vec::new();

    loop {
        let target = expected.unwrap_or(usize::MAX).min(limit);
        if builder.is_some() && entries >= target {
            break;
        }

        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
        line_no += 1;

        let line = decode_token(&raw, entries, options.lossy_utf8)?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if builder.is_none() {
            if let Some((count, dim)) = parse_header(line) {
                if dim == 0 {
                    return Err(LoadError::malformed(
                        format!("line {}", line_no),
                        "dimension must be positive",
                    ));
                }
                debug!(count, dim, "text header");
                let mut fields = line.split_whitespace();
                header_entry = fields
                    .next()
                    .zip(fields.next().and_then(|v| v.parse::<f32>().ok()))
                    .map(|(token, value)| (token.to_string(), value));
                expected = Some(count);
                builder = Some(EmbeddingSpaceBuilder::with_capacity(dim, count.min(limit)));
                continue;
            }
        }

        let mut fields = line.split_whitespace();
        let token = fields
            .next()
            .ok_or_else(|| LoadError::malformed(format!("line {}", line_no), "missing token"))?;

        values.clear();
        for field in fields {
            let value = field.parse::<f32>().map_err(|_| {
                LoadError::malformed(
                    format!("line {}", line_no),
                    format!("invalid component '{}'", field),
                )
            })?;
            values.push(value);
        }

        if let Some((token, value)) = header_entry.take() {
            let declared = builder.as_ref().map(|b| b.dimension());
            if values.len() == 1 && declared != Some(1) {
                debug!(line = line_no, "first line is an entry, not a header");
                expected = None;
                let mut fresh = EmbeddingSpaceBuilder::new(1);
                if entries < limit {
                    push_entry(&mut fresh, token, &[value], entries)?;
                    entries += 1;
                }
                builder = Some(fresh);
            }
        }

        let builder = builder.get_or_insert_with(|| EmbeddingSpaceBuilder::new(values.len()));
        if values.len() != builder.dimension() || values.is_empty() {
            return Err(LoadError::malformed(
                format!("line {}", line_no),
                format!(
                    "expected {} components, found {}",
                    builder.dimension(),
                    values.len()
                ),
            ));
        }

        if entries >= limit {
            break;
        }
        push_entry(builder, token.to_string(), &values, entries)?;
        entries += 1;
    }

    if let Some(count) = expected {
        if entries < count.min(limit) {
            return Err(LoadError::malformed(
                "end of input",
                format!("header declares {} entries, found {}", count, entries),
            ));
        }
    }

    match builder {
        Some(builder) => Ok(builder.build()?),
        None => Err(LoadError::malformed("end of input", "no header and no entries")),
    }
}
