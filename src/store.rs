//! Key-value bit-store collaborator.
//!
//! [`BitStore`] is the whole contract the crate needs from the underlying store:
//! an atomic single bit write, a raw value read, pattern key listing and deletion.
//! It mirrors the Redis `SETBIT`, `GET`, `KEYS` and `DEL` commands, so a networked
//! implementation is a thin wrapper. Transport retries and timeouts belong to the
//! implementation; errors it returns reach the caller unchanged.
//!
//! [`MemoryStore`] is the in-process implementation used by tests, benches and demos.

use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use std::sync::Arc;

use parking_lot::RwLock;
use wyhash::WyHash;

use crate::bitmap::BitVector;
use crate::error::StoreError;
use crate::key::{pattern_matches, WILDCARD};

/// Bit-store trait which must be implemented by all storage backends.
pub trait BitStore: Send + Sync {
    /// Atomically sets bit `offset` of the value at `key`, creating a zeroed value if absent.
    /// Returns the previous value of the bit.
    fn set_bit(&self, key: &str, offset: u32) -> Result<bool, StoreError>;

    /// Returns the packed bits stored at `key`, or `None` if the key was never written.
    fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Returns every present key matched by `pattern`; `*` matches one whole segment.
    fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError>;

    /// Deletes `key`, returning whether it existed.
    fn delete(&self, key: &str) -> Result<bool, StoreError>;
}

impl<T: BitStore + ?Sized> BitStore for &T {
    fn set_bit(&self, key: &str, offset: u32) -> Result<bool, StoreError> {
        (**self).set_bit(key, offset)
    }

    fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get_bytes(key)
    }

    fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        (**self).keys(pattern)
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        (**self).delete(key)
    }
}

impl<T: BitStore + ?Sized> BitStore for Arc<T> {
    fn set_bit(&self, key: &str, offset: u32) -> Result<bool, StoreError> {
        (**self).set_bit(key, offset)
    }

    fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get_bytes(key)
    }

    fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        (**self).keys(pattern)
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        (**self).delete(key)
    }
}

type ShardMap = HashMap<String, BitVector, BuildHasherDefault<WyHash>>;

/// In-memory bit-store
///
/// Writes take an exclusive lock for the duration of one bit update, which makes
/// `set_bit` atomic with respect to every other call.
#[derive(Debug, Default)]
pub struct MemoryStore {
    shards: RwLock<ShardMap>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys present.
    pub fn len(&self) -> usize {
        self.shards.read().len()
    }

    /// Whether no key is present.
    pub fn is_empty(&self) -> bool {
        self.shards.read().is_empty()
    }

    /// Total bytes held by all values.
    pub fn size_of(&self) -> usize {
        self.shards.read().values().map(|bits| bits.as_bytes().len()).sum()
    }
}

impl BitStore for MemoryStore {
    fn set_bit(&self, key: &str, offset: u32) -> Result<bool, StoreError> {
        let mut shards = self.shards.write();
        if let Some(bits) = shards.get_mut(key) {
            return Ok(bits.set(offset));
        }
        Ok(shards.entry(key.to_owned()).or_default().set(offset))
    }

    fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .shards
            .read()
            .get(key)
            .map(|bits| bits.as_bytes().to_vec()))
    }

    fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let shards = self.shards.read();
        // exact keys skip the scan
        if !pattern.contains(WILDCARD) {
            return Ok(shards.get_key_value(pattern).map(|(k, _)| k.clone()).into_iter().collect());
        }
        Ok(shards
            .keys()
            .filter(|key| pattern_matches(pattern, key))
            .cloned()
            .collect())
    }

    fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.shards.write().remove(key).is_some())
    }
}
