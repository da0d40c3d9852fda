//! Growable packed bit-vector used to accumulate shard unions.
//!
//! # Layout
//!
//! Bits are packed most-significant-bit first, which is the convention of Redis `SETBIT`
//! and `GET` on string values:
//! - bit `v` is stored in byte `v / 8`
//! - within that byte it is selected by mask `0x80 >> (v % 8)`
//!
//! The raw bytes of a shard can therefore be adopted as-is with [`BitVector::from_bytes`],
//! and [`BitVector::as_bytes`] yields exactly what a store would hold for the same bits.
//!
//! # Growth policy
//!
//! A vector only ever grows, and only to the exact byte length of the longest vector
//! merged into it. Unions touch one vector per matched shard, so growth events are bounded
//! by the number of shards and no amortised doubling is needed.

use std::fmt::{Debug, Formatter};

/// Number of bytes folded into one popcount word
const WORD_BYTES: usize = 8;

/// Packed bit-vector
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitVector {
    bytes: Vec<u8>,
}

impl BitVector {
    /// Creates an empty vector of length 0.
    #[inline]
    pub fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Adopts raw shard bytes.
    #[inline]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Returns packed bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the vector returning packed bytes.
    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Length in bits; always a multiple of 8.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len() * 8
    }

    /// Whether the vector has length 0.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Sets bit `offset`, growing the vector with zero bytes if needed.
    /// Returns the previous value of the bit.
    #[inline]
    pub fn set(&mut self, offset: u32) -> bool {
        let (idx, mask) = Self::locate(offset);
        if idx >= self.bytes.len() {
            self.bytes.resize(idx + 1, 0);
        }
        let was_set = self.bytes[idx] & mask != 0;
        self.bytes[idx] |= mask;
        was_set
    }

    /// Returns bit `offset`; bits past the end read as zero.
    #[inline]
    pub fn get(&self, offset: u32) -> bool {
        let (idx, mask) = Self::locate(offset);
        self.bytes.get(idx).is_some_and(|b| b & mask != 0)
    }

    /// Number of set bits.
    #[inline]
    pub fn count_ones(&self) -> usize {
        // fixed size chunks let the compiler vectorise the popcount
        let chunks = self.bytes.chunks_exact(WORD_BYTES);
        let tail: usize = chunks.remainder().iter().map(|b| b.count_ones() as usize).sum();
        chunks
            .map(|chunk| {
                let mut word = [0u8; WORD_BYTES];
                word.copy_from_slice(chunk);
                u64::from_ne_bytes(word).count_ones() as usize
            })
            .sum::<usize>()
            + tail
    }

    /// Position-wise OR of `other` into `self`.
    ///
    /// If `other` is longer, `self` is first right-extended with zero bits to the same
    /// length. `other` is never truncated.
    #[inline]
    pub fn union_with(&mut self, other: &[u8]) {
        if other.len() > self.bytes.len() {
            self.bytes.resize(other.len(), 0);
        }
        self.bytes
            .iter_mut()
            .zip(other)
            .for_each(|(lhs, rhs)| *lhs |= *rhs);
    }

    /// Iterates offsets of set bits in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = u32> + '_ {
        self.bytes
            .iter()
            .enumerate()
            .filter(|(_, byte)| **byte != 0)
            .flat_map(|(idx, byte)| {
                (0..8u32)
                    .filter(move |bit| byte & (0x80 >> bit) != 0)
                    .map(move |bit| idx as u32 * 8 + bit)
            })
    }

    /// Byte index and in-byte mask of bit `offset`
    #[inline]
    fn locate(offset: u32) -> (usize, u8) {
        ((offset / 8) as usize, 0x80 >> (offset % 8))
    }
}

impl From<Vec<u8>> for BitVector {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_bytes(bytes)
    }
}

impl FromIterator<u32> for BitVector {
    fn from_iter<I: IntoIterator<Item = u32>>(iter: I) -> Self {
        let mut bits = Self::new();
        iter.into_iter().for_each(|offset| {
            bits.set(offset);
        });
        bits
    }
}

impl Debug for BitVector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "BitVector {{ len: {}, ones: {} }}", self.len(), self.count_ones())
    }
}
