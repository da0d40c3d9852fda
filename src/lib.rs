//! `article-views` counts the distinct viewers of documents per day, per month or over any
//! date range, and ranks documents by distinct viewers over a window.
//!
//! Each (document, day) pair owns one packed bit-vector in a key-value bit-store, where bit
//! `v` is set when viewer `v` saw the document that day. Counting unique viewers over several
//! days is the popcount of the bitwise OR of the matching shards.
pub mod aggregator;
pub mod analytics;
pub mod bitmap;
pub mod error;
pub mod key;
#[cfg(feature = "with_serde")]
mod serde;
pub mod storage;
pub mod store;
pub mod views;

/// Viewer identifier, used as the bit offset in every shard.
///
/// The same viewer must always map to the same id for unions to count it once.
pub type ViewerId = u32;

pub use aggregator::Aggregator;
pub use analytics::{Analytics, DocumentRanking};
pub use bitmap::BitVector;
pub use error::{Error, Result, StoreError};
pub use key::{KeyBuilder, KeyPattern, KeySelector, Selector, ShardKey};
pub use storage::Storage;
pub use store::{BitStore, MemoryStore};
pub use views::ArticleViews;
