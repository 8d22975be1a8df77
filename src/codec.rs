//! Compression layer — zstd поверх сериализованного документа.
//!
//! Сжатие всегда идёт ДО шифрования: ciphertext несжимаем, компрессить его
//! после AEAD — пустая работа.

use std::io::Read;

use crate::errors::{StoreError, StoreResult};

/// Compress serialized document bytes at the given zstd level
/// (0 = library default).
pub fn compress(bytes: &[u8], level: i32) -> StoreResult<Vec<u8>> {
    let out = zstd::bulk::compress(bytes, level)?;
    log::debug!(
        "codec: compressed {} -> {} bytes (level {})",
        bytes.len(),
        out.len(),
        level
    );
    Ok(out)
}

/// Decompress a payload. The payload carries no trusted size hint, so this
/// goes through the streaming decoder instead of the bulk API.
pub fn decompress(bytes: &[u8]) -> StoreResult<Vec<u8>> {
    let cursor = std::io::Cursor::new(bytes);
    let mut decoder = zstd::stream::read::Decoder::new(cursor)
        .map_err(|e| StoreError::Format(format!("zstd decoder: {e}")))?;
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| StoreError::Format(format!("zstd decompress: {e}")))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compress_decompress_roundtrip() {
        let data = b"aaaaaaaaaaaaaaaaaaaabbbbbbbbbbbbbbbbbbbb".repeat(64);
        let packed = compress(&data, 0).unwrap();
        assert!(packed.len() < data.len());
        let back = decompress(&packed).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn higher_level_still_roundtrips() {
        let data = b"the quick brown fox".repeat(100);
        let packed = compress(&data, 19).unwrap();
        assert_eq!(decompress(&packed).unwrap(), data);
    }

    #[test]
    fn garbage_fails_as_format_error() {
        let err = decompress(b"\xde\xad\xbe\xef not zstd").unwrap_err();
        assert!(matches!(err, StoreError::Format(_)));
    }

    #[test]
    fn empty_input_roundtrips() {
        let packed = compress(b"", 0).unwrap();
        assert_eq!(decompress(&packed).unwrap(), Vec::<u8>::new());
    }
}
