//! Error types shared by every component.
//!
//! Validation failures are raised while building keys, before any store round-trip.
//! Failures reported by the [`BitStore`](crate::store::BitStore) collaborator are wrapped
//! once into [`Error::Store`] and handed back to the caller untouched.

/// Errors reported by a [`BitStore`](crate::store::BitStore) implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Crate level error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid document id {0:?}: must be non-empty and contain neither ':' nor '*'")]
    InvalidDocumentId(String),

    #[error("invalid key namespace {0:?}: must be non-empty and contain neither ':' nor '*'")]
    InvalidNamespace(String),

    #[error("invalid month {0}: expected 1..=12")]
    InvalidMonth(u32),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias used across the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;
