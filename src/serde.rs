//! # Serde module for BitVector and DocumentRanking
//!
//! `BitVector` is serialized as its packed bytes, exactly as a store holds a shard, so a
//! serialized aggregate can be written back as a shard value or compared against one.
//!
//! `DocumentRanking` is serialized as a sequence of `(document, count)` tuples in ranking
//! order. Deserialization re-applies the ranking order and drops zero counts, so any
//! deserialized ranking upholds the same ordering guarantees as a computed one.
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize};

use crate::analytics::DocumentRanking;
use crate::bitmap::BitVector;

impl Serialize for BitVector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bytes(self.as_bytes())
    }
}

impl<'de> Deserialize<'de> for BitVector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bytes: Vec<u8> = Deserialize::deserialize(deserializer)?;
        Ok(BitVector::from_bytes(bytes))
    }
}

impl Serialize for DocumentRanking {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for entry in &self.entries {
            seq.serialize_element(entry)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for DocumentRanking {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let entries: Vec<(String, usize)> = Deserialize::deserialize(deserializer)?;
        Ok(DocumentRanking::from_counts(entries))
    }
}
