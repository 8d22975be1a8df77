//! Store façade — in-memory map + options, save/open через codec.
//!
//! `save` каждый раз переписывает файл целиком; `open` целиком заменяет
//! карту. Partial save/merge семантики нет. Один save/open в полёте на
//! инстанс — конкурентные вызовы сериализует вызывающая сторона.

use std::collections::hash_map;
use std::collections::HashMap;
use std::hash::Hash;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::document::{Document, Record};
use crate::errors::StoreResult;
use crate::format;
use crate::options::StoreOptions;

/// Embeddable key-value store persisted to a single file.
#[derive(Debug)]
pub struct Store<K, V> {
    kvs: HashMap<K, V>,
    options: StoreOptions,
}

impl<K, V> Store<K, V>
where
    K: Eq + Hash,
{
    /// New empty store bound to the given options. Nothing touches the disk
    /// until `save`.
    pub fn new(options: StoreOptions) -> Self {
        Self {
            kvs: HashMap::new(),
            options,
        }
    }

    /// Convenience: empty store at `path`, default compression, no password.
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self::new(StoreOptions::new(path))
    }

    /// Store seeded from an iterator of pairs. Later duplicates win, as with
    /// repeated `insert`. Nothing touches the disk until `save`.
    pub fn from_pairs<I: IntoIterator<Item = (K, V)>>(options: StoreOptions, pairs: I) -> Self {
        Self {
            kvs: pairs.into_iter().collect(),
            options,
        }
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    // ---- dictionary surface ----

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.kvs.insert(key, value)
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.kvs.get(key)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.kvs.remove(key)
    }

    pub fn clear(&mut self) {
        self.kvs.clear();
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.kvs.contains_key(key)
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.kvs.values().any(|v| v == value)
    }

    /// Insert only if the key is absent. Returns false (and keeps the
    /// existing value) when it is present.
    pub fn try_insert(&mut self, key: K, value: V) -> bool {
        match self.kvs.entry(key) {
            hash_map::Entry::Occupied(_) => false,
            hash_map::Entry::Vacant(e) => {
                e.insert(value);
                true
            }
        }
    }

    pub fn get_or_insert_with<F: FnOnce(&K) -> V>(&mut self, key: K, make: F) -> &V {
        match self.kvs.entry(key) {
            hash_map::Entry::Occupied(e) => e.into_mut(),
            hash_map::Entry::Vacant(e) => {
                let value = make(e.key());
                e.insert(value)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.kvs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kvs.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.kvs.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.kvs.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.kvs.iter()
    }
}

impl<K, V> Store<K, V>
where
    K: Eq + Hash + Serialize + DeserializeOwned,
    V: Serialize + DeserializeOwned,
{
    /// Materialize a document from the live map and rewrite the whole file.
    pub fn save(&self) -> StoreResult<()> {
        // Document of references: no clone of the live entries needed.
        let doc = Document::new(
            self.kvs
                .iter()
                .map(|(key, value)| Record { key, value })
                .collect(),
        );
        format::write_store_file(&doc, &self.options)
    }

    /// Read the file named by `options` and rebuild the map, replacing any
    /// in-memory state a previous instance might have carried.
    pub fn open(options: StoreOptions) -> StoreResult<Self> {
        let doc: Document<K, V> =
            format::read_store_file(options.path(), options.password.as_deref())?;
        let kvs = doc
            .store
            .into_iter()
            .map(|r| (r.key, r.value))
            .collect::<HashMap<K, V>>();
        Ok(Self { kvs, options })
    }
}

impl<K: Eq + Hash, V> Extend<(K, V)> for Store<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        self.kvs.extend(iter);
    }
}

impl<'a, K, V> IntoIterator for &'a Store<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = hash_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.kvs.iter()
    }
}

impl<K, V> IntoIterator for Store<K, V> {
    type Item = (K, V);
    type IntoIter = hash_map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.kvs.into_iter()
    }
}
