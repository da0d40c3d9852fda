//! Storage adapter translating shard operations into [`BitStore`] calls.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::error::Result;
use crate::key::{KeySelector, Selector, ShardKey};
use crate::store::BitStore;
use crate::ViewerId;

/// Thin adapter over an injected [`BitStore`].
#[derive(Debug, Clone, Default)]
pub struct Storage<S> {
    store: S,
}

impl<S: BitStore> Storage<S> {
    /// Wraps `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the wrapped store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Records `viewer` in the shard at `key`, creating the shard if absent.
    /// Recording an already present viewer is a no-op.
    pub fn mark_viewed(&self, key: &ShardKey, viewer: ViewerId) -> Result<()> {
        let was_set = self.store.set_bit(key.as_str(), viewer)?;
        trace!(key = %key, viewer, was_set, "marked viewer");
        Ok(())
    }

    /// Returns the packed bits of a shard, or `None` if it was never created.
    pub fn fetch_raw(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.store.get_bytes(key)?)
    }

    /// Expands selectors into the set of concrete keys currently present.
    pub fn enumerate(&self, selectors: &[KeySelector]) -> Result<BTreeSet<String>> {
        let mut keys = BTreeSet::new();
        for selector in selectors {
            keys.extend(self.store.keys(selector.as_str())?);
        }
        debug!(selectors = selectors.len(), keys = keys.len(), "enumerated shards");
        Ok(keys)
    }

    /// Deletes one shard, returning whether it existed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.store.delete(key)?)
    }

    /// Deletes every shard matched by `selectors`, returning how many were removed.
    pub fn purge(&self, selectors: &[KeySelector]) -> Result<usize> {
        let mut removed = 0;
        for key in self.enumerate(selectors)? {
            if self.remove(&key)? {
                removed += 1;
            }
        }
        debug!(removed, "purged shards");
        Ok(removed)
    }
}
