//! Shard union and cardinality.
//!
//! Every shard stores viewer `v` at the same bit offset, so the number of distinct viewers
//! across any set of shards is the popcount of their bitwise OR. Shards differ in length
//! because a shard only grows as far as its highest recorded viewer; the accumulator is
//! extended to the longest shard seen and never truncates one.
//!
//! OR is commutative, associative and idempotent: the result does not depend on the order in
//! which shards are fetched, nor on a shard being selected twice. Zero matched shards
//! count as 0, and the work is linear in the total size of matched shards.

use tracing::{debug, trace};

use crate::bitmap::BitVector;
use crate::error::Result;
use crate::key::KeySelector;
use crate::storage::Storage;
use crate::store::BitStore;

/// Unions shards selected through a [`Storage`].
#[derive(Debug)]
pub struct Aggregator<'a, S> {
    storage: &'a Storage<S>,
}

impl<'a, S: BitStore> Aggregator<'a, S> {
    /// Creates an aggregator reading from `storage`.
    pub fn new(storage: &'a Storage<S>) -> Self {
        Self { storage }
    }

    /// Returns the union of every shard matched by `selectors`.
    ///
    /// Shards that disappear between enumeration and fetch contribute nothing.
    pub fn union(&self, selectors: &[KeySelector]) -> Result<BitVector> {
        let keys = self.storage.enumerate(selectors)?;
        let mut acc = BitVector::new();
        for key in &keys {
            let Some(bytes) = self.storage.fetch_raw(key)? else {
                trace!(%key, "shard vanished before fetch");
                continue;
            };
            trace!(%key, bytes = bytes.len(), "merging shard");
            acc.union_with(&bytes);
        }
        Ok(acc)
    }

    /// Returns the number of distinct viewers across every shard matched by `selectors`.
    pub fn count_union(&self, selectors: &[KeySelector]) -> Result<usize> {
        let count = self.union(selectors)?.count_ones();
        debug!(selectors = selectors.len(), count, "counted union");
        Ok(count)
    }
}
