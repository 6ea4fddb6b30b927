use std::{fmt::Display, hash::Hash, sync::Arc};

use ahash::RandomState;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{trace, warn};

use crate::{
    dataset::{FieldProjector, RecordSource},
    error::Result,
    vectorizer::{builder::VectorBuilder, VectorSpace},
};

/// Keyed byte store used to keep related lists and vector spaces across requests.
///
/// The engine never picks a backend by name; callers hand over the store they resolved.
pub trait CacheStore {
    fn get(&self, key: &str) -> Option<Vec<u8>>;
    fn set(&self, key: &str, value: Vec<u8>);
    fn delete(&self, key: &str);
}

impl<C> CacheStore for &C
where
    C: CacheStore + ?Sized,
{
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Vec<u8>) {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) {
        (**self).delete(key)
    }
}

impl<C> CacheStore for Arc<C>
where
    C: CacheStore + ?Sized,
{
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: Vec<u8>) {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) {
        (**self).delete(key)
    }
}

/// In-process store, safe to share between threads.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<Box<str>, Vec<u8>, RandomState>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_hasher(RandomState::new()),
        }
    }

    pub fn remove(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.remove(key).map(|(_, value)| value)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: Vec<u8>) {
        self.entries.insert(key.into(), value);
    }

    fn delete(&self, key: &str) {
        self.entries.remove(key);
    }
}

/// Decode a CBOR value; `Ok(None)` on a miss.
pub fn get_cached<C, T>(store: &C, key: &str) -> Result<Option<T>>
where
    C: CacheStore + ?Sized,
    T: DeserializeOwned,
{
    match store.get(key) {
        Some(bytes) => Ok(Some(serde_cbor::from_slice(&bytes)?)),
        None => Ok(None),
    }
}

/// Encode `value` as CBOR and store it under `key`.
pub fn set_cached<C, T>(store: &C, key: &str, value: &T) -> Result<()>
where
    C: CacheStore + ?Sized,
    T: Serialize,
{
    store.set(key, serde_cbor::to_vec(value)?);
    Ok(())
}

/// Key of the related list of `target` for a space built from `signature` records.
pub fn related_cache_key<K: Display>(target: &K, signature: usize) -> String {
    format!("related:{target}:{signature}")
}

/// Related ids of `target`, served from `store` when the list for the
/// current signature is already there.
///
/// The full ranked list is cached; `limit` only truncates what is returned.
/// An entry that fails to decode is recomputed and overwritten.
///
/// When this call is the one that moves `builder` to a new signature, the
/// entry of `target` under the old signature is deleted. Entries of other
/// targets under the old signature are left to the store's own eviction.
pub fn cached_related<C, S, P>(
    store: &C,
    builder: &mut VectorBuilder<S, P>,
    target: &S::Key,
    limit: Option<usize>,
) -> Result<Vec<S::Key>>
where
    C: CacheStore + ?Sized,
    S: RecordSource,
    S::Key: Display + Serialize + DeserializeOwned + Send + Sync,
    P: FieldProjector<S::Record>,
{
    let previous = builder.key();
    let signature = builder.flush()?.signature;
    let key = related_cache_key(target, signature);
    if let Some(previous) = previous.filter(|&previous| previous != signature) {
        let stale = related_cache_key(target, previous);
        trace!(%stale, "dropping related list of previous signature");
        store.delete(&stale);
    }

    let mut related = match get_cached::<C, Vec<S::Key>>(store, &key) {
        Ok(Some(related)) => {
            trace!(%key, "related cache hit");
            related
        }
        miss => {
            if let Err(err) = miss {
                warn!(%key, error = %err, "dropping undecodable related cache entry");
            } else {
                trace!(%key, "related cache miss");
            }
            let related = builder.related(target, None)?;
            set_cached(store, &key, &related)?;
            related
        }
    };

    if let Some(limit) = limit {
        related.truncate(limit);
    }
    Ok(related)
}

/// Persist a built vector space under `key`.
pub fn store_vector_space<C, K>(store: &C, key: &str, space: &VectorSpace<K>) -> Result<()>
where
    C: CacheStore + ?Sized,
    K: Eq + Hash + Serialize,
{
    set_cached(store, key, space)
}

/// Load a vector space stored with [`store_vector_space`].
pub fn load_vector_space<C, K>(store: &C, key: &str) -> Result<Option<VectorSpace<K>>>
where
    C: CacheStore + ?Sized,
    K: Eq + Hash + DeserializeOwned,
{
    get_cached(store, key)
}
