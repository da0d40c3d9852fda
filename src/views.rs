//! Recording views and counting unique viewers of one document.

use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::aggregator::Aggregator;
use crate::bitmap::BitVector;
use crate::error::Result;
use crate::key::{KeyBuilder, KeySelector, Selector};
use crate::storage::Storage;
use crate::store::BitStore;
use crate::ViewerId;

/// Per-document view recording and unique viewer queries.
///
/// ```
/// use article_views::{ArticleViews, MemoryStore};
/// use chrono::NaiveDate;
///
/// let views = ArticleViews::new(MemoryStore::new());
/// let day = NaiveDate::from_ymd_opt(2012, 6, 12).unwrap();
/// views.view_article("home", 5, day).unwrap();
/// views.view_article("home", 5, day).unwrap();
/// assert_eq!(views.article_views("home", day).unwrap(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ArticleViews<S> {
    keys: KeyBuilder,
    storage: Storage<S>,
}

impl<S: BitStore> ArticleViews<S> {
    /// Creates a facade over `store` with the default key namespace.
    pub fn new(store: S) -> Self {
        Self::with_key_builder(store, KeyBuilder::new())
    }

    /// Creates a facade over `store` using `keys` to name shards.
    pub fn with_key_builder(store: S, keys: KeyBuilder) -> Self {
        Self {
            keys,
            storage: Storage::new(store),
        }
    }

    pub fn key_builder(&self) -> &KeyBuilder {
        &self.keys
    }

    pub fn storage(&self) -> &Storage<S> {
        &self.storage
    }

    /// Records that `viewer` saw `doc` on `date`.
    #[instrument(level = "debug", skip(self))]
    pub fn view_article(&self, doc: &str, viewer: ViewerId, date: NaiveDate) -> Result<()> {
        let key = self.keys.document_key(doc, date)?;
        self.storage.mark_viewed(&key, viewer)
    }

    /// Whether `viewer` was recorded for `doc` on `date`.
    pub fn has_viewed(&self, doc: &str, viewer: ViewerId, date: NaiveDate) -> Result<bool> {
        let key = self.keys.document_key(doc, date)?;
        Ok(self
            .storage
            .fetch_raw(key.as_str())?
            .is_some_and(|bytes| BitVector::from_bytes(bytes).get(viewer)))
    }

    /// Unique viewers of `doc` on `date`.
    #[instrument(level = "debug", skip(self))]
    pub fn article_views(&self, doc: &str, date: NaiveDate) -> Result<usize> {
        let key = self.keys.document_key(doc, date)?;
        self.count(&[KeySelector::from(key)])
    }

    /// Unique viewers of `doc` over every day of `month` in `year`.
    #[instrument(level = "debug", skip(self))]
    pub fn article_monthly_views(&self, doc: &str, month: u32, year: i32) -> Result<usize> {
        let pattern = self.keys.month_pattern(doc, month, year)?;
        self.count(&[KeySelector::from(pattern)])
    }

    /// Unique viewers of `doc` over `[from, to]`; an inverted range counts 0.
    #[instrument(level = "debug", skip(self))]
    pub fn article_daterange_views(&self, doc: &str, from: NaiveDate, to: NaiveDate) -> Result<usize> {
        let selectors: Vec<KeySelector> = self
            .keys
            .range_keys(doc, from, to)?
            .into_iter()
            .map(KeySelector::from)
            .collect();
        if selectors.is_empty() {
            debug!("inverted date range");
            return Ok(0);
        }
        self.count(&selectors)
    }

    #[inline]
    fn count(&self, selectors: &[KeySelector]) -> Result<usize> {
        Aggregator::new(&self.storage).count_union(selectors)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::error::Error;
    use crate::store::MemoryStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_key_has_zero_views() {
        let views = ArticleViews::new(MemoryStore::new());
        assert_eq!(views.article_views("test_document", date(2012, 6, 12)).unwrap(), 0);
        assert_eq!(views.article_monthly_views("test_document", 6, 2012).unwrap(), 0);
        assert_eq!(
            views
                .article_daterange_views("test_document", date(2012, 6, 12), date(2012, 6, 14))
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_out_of_range_views() {
        let views = ArticleViews::new(MemoryStore::new());
        views.view_article("test_document", 1, date(2012, 8, 22)).unwrap();
        assert_eq!(views.article_views("test_document", date(2012, 6, 12)).unwrap(), 0);
        assert_eq!(views.article_monthly_views("test_document", 6, 2012).unwrap(), 0);
        assert_eq!(
            views
                .article_daterange_views("test_document", date(2012, 6, 12), date(2012, 6, 14))
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_different_document_views() {
        let views = ArticleViews::new(MemoryStore::new());
        views.view_article("test_document_1", 1, date(2012, 8, 22)).unwrap();
        assert_eq!(views.article_views("test_document_2", date(2012, 8, 22)).unwrap(), 0);
    }

    #[test]
    fn test_daily_views() {
        let views = ArticleViews::new(MemoryStore::new());
        let day = date(2012, 6, 12);
        views.view_article("test_document", 1, day).unwrap();
        assert_eq!(views.article_views("test_document", day).unwrap(), 1);
        views.view_article("test_document", 1, day).unwrap();
        assert_eq!(views.article_views("test_document", day).unwrap(), 1);
        views.view_article("test_document", 5, day).unwrap();
        assert_eq!(views.article_views("test_document", day).unwrap(), 2);
    }

    #[test]
    fn test_monthly_views() {
        let views = ArticleViews::new(MemoryStore::new());
        views.view_article("test_document", 1, date(2012, 6, 12)).unwrap();
        views.view_article("test_document", 5, date(2012, 6, 14)).unwrap();
        views.view_article("test_document", 5, date(2012, 6, 30)).unwrap();
        views.view_article("test_document", 7, date(2012, 7, 1)).unwrap();
        assert_eq!(views.article_monthly_views("test_document", 6, 2012).unwrap(), 2);
        assert_eq!(views.article_monthly_views("test_document", 7, 2012).unwrap(), 1);
    }

    #[test]
    fn test_daterange_views() {
        let views = ArticleViews::new(MemoryStore::new());
        views.view_article("test_document", 5, date(2012, 6, 12)).unwrap();
        views.view_article("test_document", 5, date(2012, 6, 14)).unwrap();
        views.view_article("test_document", 1, date(2012, 6, 14)).unwrap();
        views.view_article("test_document", 9, date(2012, 6, 15)).unwrap();

        let count = |from, to| views.article_daterange_views("test_document", from, to).unwrap();
        assert_eq!(count(date(2012, 6, 12), date(2012, 6, 14)), 2);
        assert_eq!(count(date(2012, 6, 14), date(2012, 6, 14)), 2);
        assert_eq!(count(date(2012, 6, 12), date(2012, 6, 12)), 1);
        assert_eq!(count(date(2012, 6, 14), date(2012, 6, 12)), 0);
        assert_eq!(count(date(2012, 6, 1), date(2012, 6, 30)), 3);
    }

    #[test]
    fn test_has_viewed() {
        let views = ArticleViews::new(MemoryStore::new());
        let day = date(2012, 6, 12);
        assert!(!views.has_viewed("doc", 3, day).unwrap());
        views.view_article("doc", 3, day).unwrap();
        assert!(views.has_viewed("doc", 3, day).unwrap());
        assert!(!views.has_viewed("doc", 4, day).unwrap());
    }

    #[test]
    fn test_invalid_document() {
        let views = ArticleViews::new(MemoryStore::new());
        let result = views.view_article("bad:doc", 1, date(2012, 6, 12));
        assert!(matches!(result, Err(Error::InvalidDocumentId(_))));
        assert!(views.storage().store().is_empty());
    }
}
