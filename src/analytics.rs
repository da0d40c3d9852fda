//! Cross-document queries.
//!
//! Document ids are discovered from the shard keys present in the store, so only documents
//! with at least one recorded view are known.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::key::KeySelector;
use crate::store::BitStore;
use crate::views::ArticleViews;

/// Documents ordered by unique viewer count.
///
/// Entries are sorted by count descending; equal counts are ordered by document id
/// ascending (byte-wise), which keeps the ranking independent of store iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentRanking {
    pub(crate) entries: Vec<(String, usize)>,
}

impl DocumentRanking {
    /// Builds a ranking from unordered entries, dropping zero counts.
    pub fn from_counts(counts: impl IntoIterator<Item = (String, usize)>) -> Self {
        let mut entries: Vec<(String, usize)> =
            counts.into_iter().filter(|(_, count)| *count > 0).collect();
        entries.sort_unstable_by(|(lhs_doc, lhs), (rhs_doc, rhs)| {
            (Reverse(lhs), lhs_doc).cmp(&(Reverse(rhs), rhs_doc))
        });
        Self { entries }
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<(String, usize)> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keeps only the first `limit` entries.
    pub fn truncate(&mut self, limit: usize) {
        self.entries.truncate(limit);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(doc, count)| (doc.as_str(), *count))
    }
}

/// Analytics over every known document.
#[derive(Debug)]
pub struct Analytics<'a, S> {
    views: &'a ArticleViews<S>,
}

impl<'a, S: BitStore> Analytics<'a, S> {
    pub fn new(views: &'a ArticleViews<S>) -> Self {
        Self { views }
    }

    /// Every document with at least one shard, in ascending id order.
    #[instrument(level = "debug", skip(self))]
    pub fn all_articles(&self) -> Result<BTreeSet<String>> {
        let keys = self.views.key_builder();
        let pattern = keys.all_documents_pattern();
        let shards = self.views.storage().enumerate(&[KeySelector::from(pattern)])?;
        let docs: BTreeSet<String> = shards
            .iter()
            .filter_map(|key| keys.document_of(key))
            .map(str::to_owned)
            .collect();
        debug!(shards = shards.len(), documents = docs.len(), "discovered documents");
        Ok(docs)
    }

    /// Ranks every document by unique viewers over `[from, to]`.
    #[instrument(level = "debug", skip(self))]
    pub fn date_range_views(&self, from: NaiveDate, to: NaiveDate) -> Result<DocumentRanking> {
        let mut counts = Vec::new();
        for doc in self.all_articles()? {
            let count = self.views.article_daterange_views(&doc, from, to)?;
            counts.push((doc, count));
        }
        Ok(DocumentRanking::from_counts(counts))
    }

    /// First `limit` entries of [`Analytics::date_range_views`].
    pub fn top_articles(&self, from: NaiveDate, to: NaiveDate, limit: usize) -> Result<DocumentRanking> {
        let mut ranking = self.date_range_views(from, to)?;
        ranking.truncate(limit);
        Ok(ranking)
    }
}
