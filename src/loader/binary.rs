//! word2vec binary layout
//!
//! - Header: ASCII `"<count> <dim>\n"`
//! - Entries: token bytes, a single space, then `dim` little-endian f32s,
//!   optionally followed by `'\n'`

use std::io::{self, BufRead, Read};

use bytes::Buf;
use tracing::debug;

use super::{decode_token, parse_header, push_entry, LoadOptions};
use crate::error::LoadError;
use crate::vector::{EmbeddingSpace, EmbeddingSpaceBuilder};

/// Read a binary artifact into an embedding space
pub fn read_binary<R: BufRead>(mut reader: R, options: &LoadOptions) -> Result<EmbeddingSpace, LoadError> {
    let mut header = Vec::new();
    reader.read_until(b'\n', &mut header)?;
    let header = std::str::from_utf8(&header)
        .ok()
        .and_then(parse_header)
        .ok_or_else(|| LoadError::malformed("header", "expected '<count> <dim>'"))?;
    let (count, dim) = header;
    if dim == 0 {
        return Err(LoadError::malformed("header", "dimension must be positive"));
    }

    let row_bytes = dim
        .checked_mul(std::mem::size_of::<f32>())
        .ok_or_else(|| LoadError::malformed("header", "dimension too large"))?;

    let count = count.min(options.limit.unwrap_or(usize::MAX));
    debug!(count, dim, "binary header");

    let mut builder = EmbeddingSpaceBuilder::with_capacity(dim, count);
    let mut token = Vec::new();
    let mut raw = Vec::new();
    let mut values = Vec::new();

    for entry in 0..count {
        token.clear();
        reader.read_until(b' ', &mut token)?;
        if token.pop() != Some(b' ') {
            return Err(unexpected_eof(entry).into());
        }

        // The newline ending the previous vector is optional
        let start = token.iter().position(|b| *b != b'\n').unwrap_or(token.len());
        let name = &token[start..];
        if name.is_empty() {
            return Err(LoadError::malformed(format!("entry {}", entry), "empty token"));
        }
        let name = decode_token(name, entry, options.lossy_utf8)?;

        // Grows with the bytes actually present, not the declared dimension
        raw.clear();
        let read = reader
            .by_ref()
            .take(row_bytes as u64)
            .read_to_end(&mut raw)?;
        if read < row_bytes {
            return Err(unexpected_eof(entry).into());
        }

        values.clear();
        let mut buf = &raw[..];
        while buf.has_remaining() {
            values.push(buf.get_f32_le());
        }

        push_entry(&mut builder, name, &values, entry)?;
    }

    Ok(builder.build()?)
}

fn unexpected_eof(entry: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!(
            "unexpected end of input at entry {}; is the header count incorrect or the file damaged?",
            entry
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};
    use std::io::Cursor;

    fn encode(entries: &[(&str, Vec<f32>)], dim: usize, trailing_newline: bool) -> Vec<u8> {
        let mut buf = BytesMut::new();
        buf.put_slice(format!("{} {}\n", entries.len(), dim).as_bytes());
        for (token, vector) in entries {
            buf.put_slice(token.as_bytes());
            buf.put_u8(b' ');
            for x in vector.iter() {
                buf.put_f32_le(*x);
            }
            if trailing_newline {
                buf.put_u8(b'\n');
            }
        }
        buf.to_vec()
    }

    fn read(input: Vec<u8>, options: &LoadOptions) -> Result<EmbeddingSpace, LoadError> {
        read_binary(Cursor::new(input), options)
    }

    #[test]
    fn test_read_entries() {
        for trailing_newline in [true, false] {
            let input = encode(
                &[
                    ("russian", vec![0.5, -0.25, 1.0]),
                    ("french", vec![0.0, 1.5, -2.0]),
                ],
                3,
                trailing_newline,
            );
            let space = read(input, &LoadOptions::default()).unwrap();

            assert_eq!(space.dimension(), 3);
            assert_eq!(space.tokens(), &["russian", "french"]);
            assert_eq!(space.vector_of("french").unwrap(), &[0.0, 1.5, -2.0]);
        }
    }

    #[test]
    fn test_limit() {
        let input = encode(
            &[
                ("a", vec![1.0, 0.0]),
                ("b", vec![0.0, 1.0]),
                ("c", vec![-1.0, 0.0]),
            ],
            2,
            true,
        );
        let space = read(input, &LoadOptions::default().with_limit(2)).unwrap();
        assert_eq!(space.len(), 2);
        assert!(!space.contains("c"));
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let input = encode(&[("a", vec![1.0]), ("a", vec![2.0])], 1, true);
        let space = read(input, &LoadOptions::default()).unwrap();
        assert_eq!(space.len(), 1);
        assert_eq!(space.vector_of("a").unwrap(), &[1.0]);
    }

    #[test]
    fn test_truncated_vector() {
        let mut input = encode(&[("a", vec![1.0, 2.0])], 2, false);
        input.truncate(input.len() - 3);
        let err = read(input, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_header_count_too_large() {
        let mut input = b"2 1\n".to_vec();
        input.extend_from_slice(b"a ");
        input.extend_from_slice(&1.0f32.to_le_bytes());
        let err = read(input, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }

    #[test]
    fn test_oversized_header_is_an_error() {
        let err = read(b"18446744073709551615 300\n".to_vec(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));

        let err = read(b"1 4611686018427387904\n".to_vec(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { .. }));

        let mut input = b"1 1000000000000\na ".to_vec();
        input.extend_from_slice(&1.0f32.to_le_bytes());
        let err = read(input, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Io(ref e) if e.kind() == io::ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_bad_header() {
        let err = read(b"not a header\n".to_vec(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { .. }));

        let err = read(b"3 0\n".to_vec(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { .. }));
    }

    #[test]
    fn test_non_finite_component() {
        let input = encode(&[("a", vec![f32::NAN])], 1, true);
        let err = read(input, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Space(_)));
    }

    #[test]
    fn test_invalid_utf8_token() {
        let mut input = b"1 1\n\xffbad ".to_vec();
        input.extend_from_slice(&1.0f32.to_le_bytes());
        let err = read(input.clone(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidUtf8 { entry: 0 }));

        let space = read(input, &LoadOptions::default().with_lossy_utf8(true)).unwrap();
        assert_eq!(space.len(), 1);
    }
}
