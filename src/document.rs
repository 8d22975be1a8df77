//! Record/Document model — the serializable shape of the stored data.
//!
//! A `Document` is built fresh from the live map on every save and discarded
//! after writing; it is rebuilt fresh on every open and discarded once the
//! map is populated. It has no persistent identity of its own.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::{StoreError, StoreResult};

/// An immutable (key, value) pair inside a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record<K, V> {
    pub key: K,
    pub value: V,
}

/// Ordered sequence of records; the sole unit serialized to/from bytes.
//
// `store` is the only field for now; the struct (rather than a bare Vec)
// keeps the wire shape open for future metadata fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document<K, V> {
    pub store: Vec<Record<K, V>>,
}

impl<K, V> Document<K, V> {
    pub fn new(store: Vec<Record<K, V>>) -> Self {
        Self { store }
    }

    pub fn empty() -> Self {
        Self { store: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl<K: Serialize, V: Serialize> Document<K, V> {
    /// Canonical byte encoding (JSON): self-describing, lossless for any
    /// serde-compatible key/value pair, record order preserved verbatim.
    pub fn to_bytes(&self) -> StoreResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| StoreError::Format(format!("encode document: {e}")))
    }
}

impl<K: DeserializeOwned, V: DeserializeOwned> Document<K, V> {
    pub fn from_bytes(bytes: &[u8]) -> StoreResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| StoreError::Format(format!("decode document: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_bytes_roundtrip_preserves_order() {
        let doc = Document::new(vec![
            Record {
                key: "b".to_string(),
                value: 2u32,
            },
            Record {
                key: "a".to_string(),
                value: 1u32,
            },
        ]);

        let bytes = doc.to_bytes().unwrap();
        let back: Document<String, u32> = Document::from_bytes(&bytes).unwrap();
        assert_eq!(back, doc, "sequence order must survive the encoding");
    }

    #[test]
    fn empty_document_is_valid() {
        let doc: Document<u32, String> = Document::empty();
        let bytes = doc.to_bytes().unwrap();
        let back: Document<u32, String> = Document::from_bytes(&bytes).unwrap();
        assert!(back.is_empty());
    }

    #[test]
    fn garbage_bytes_fail_as_format_error() {
        let err = Document::<u32, String>::from_bytes(b"\x00\x01not json").unwrap_err();
        assert!(matches!(err, StoreError::Format(_)));
    }
}
