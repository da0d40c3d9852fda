//! Shard key naming.
//!
//! Every (document, day) pair owns one shard stored under
//! `{namespace}:{document}:{year}:{month}:{day}`, with the namespace defaulting to `views`
//! and numeric fields written in decimal without leading zeros, e.g. `views:home:2012:6:12`.
//!
//! Queries select shards through [`KeySelector`]s: either an exact [`ShardKey`] or a
//! [`KeyPattern`] in which whole segments are replaced by the `*` wildcard. A wildcard
//! always stands for exactly one segment, so `views:home:2012:6:*` selects every day of
//! June 2012 and `views:*:*:*:*` selects every shard of the namespace.

use std::fmt::{Display, Formatter};

use chrono::{Datelike, NaiveDate};
use enum_dispatch::enum_dispatch;

use crate::error::{Error, Result};

/// Segment delimiter
pub const DELIMITER: char = ':';
/// Single segment wildcard
pub const WILDCARD: &str = "*";
/// Namespace used by [`KeyBuilder::new`]
pub const DEFAULT_NAMESPACE: &str = "views";

/// Number of segments in a shard key
const KEY_SEGMENTS: usize = 5;

/// Selector trait which must be implemented by all key selector kinds.
#[enum_dispatch]
pub trait Selector {
    /// Key or pattern text as understood by the store.
    fn as_str(&self) -> &str;

    /// Whether this selector names exactly one key.
    fn is_exact(&self) -> bool;

    /// Whether a concrete key is selected.
    fn matches(&self, key: &str) -> bool {
        pattern_matches(self.as_str(), key)
    }
}

/// Exact name of one (document, day) shard.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShardKey(String);

/// Shard key with one or more segments replaced by [`WILDCARD`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyPattern(String);

/// Unit of selection for a query.
#[enum_dispatch(Selector)]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeySelector {
    Exact(ShardKey),
    Pattern(KeyPattern),
}

impl Selector for ShardKey {
    #[inline]
    fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    fn is_exact(&self) -> bool {
        true
    }

    #[inline]
    fn matches(&self, key: &str) -> bool {
        self.0 == key
    }
}

impl Selector for KeyPattern {
    #[inline]
    fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    fn is_exact(&self) -> bool {
        false
    }
}

impl AsRef<str> for ShardKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for KeyPattern {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for ShardKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Display for KeyPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Display for KeySelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns whether `key` is selected by `pattern`.
///
/// Both are split on [`DELIMITER`]; they match when they have the same number of segments
/// and every pattern segment is either [`WILDCARD`] or equal to the key segment.
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    let mut pattern_segments = pattern.split(DELIMITER);
    let mut key_segments = key.split(DELIMITER);
    loop {
        match (pattern_segments.next(), key_segments.next()) {
            (None, None) => return true,
            (Some(p), Some(k)) if p == WILDCARD || p == k => continue,
            _ => return false,
        }
    }
}

/// Builds shard keys and patterns for one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBuilder {
    namespace: String,
}

impl Default for KeyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyBuilder {
    /// Creates a key builder for the default `views` namespace.
    pub fn new() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_owned(),
        }
    }

    /// Creates a key builder writing keys under `namespace`.
    pub fn with_namespace(namespace: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        if !is_valid_segment(&namespace) {
            return Err(Error::InvalidNamespace(namespace));
        }
        Ok(Self { namespace })
    }

    /// Returns the first segment of every key built here.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Key of the shard holding viewers of `doc` on `date`.
    pub fn document_key(&self, doc: &str, date: NaiveDate) -> Result<ShardKey> {
        validate_document(doc)?;
        Ok(self.format_key(doc, date))
    }

    /// Pattern selecting every day shard of `doc` in the given month.
    pub fn month_pattern(&self, doc: &str, month: u32, year: i32) -> Result<KeyPattern> {
        validate_document(doc)?;
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidMonth(month));
        }
        Ok(KeyPattern(format!(
            "{ns}{d}{doc}{d}{year}{d}{month}{d}{WILDCARD}",
            ns = self.namespace,
            d = DELIMITER,
        )))
    }

    /// One key per calendar day in `[from, to]`, in ascending date order.
    ///
    /// An inverted range (`to < from`) yields no keys.
    pub fn range_keys(&self, doc: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<ShardKey>> {
        validate_document(doc)?;
        if to < from {
            return Ok(Vec::new());
        }
        Ok(from
            .iter_days()
            .take_while(|day| *day <= to)
            .map(|day| self.format_key(doc, day))
            .collect())
    }

    /// Pattern selecting every shard of the namespace.
    pub fn all_documents_pattern(&self) -> KeyPattern {
        KeyPattern(format!(
            "{ns}{d}{WILDCARD}{d}{WILDCARD}{d}{WILDCARD}{d}{WILDCARD}",
            ns = self.namespace,
            d = DELIMITER,
        ))
    }

    /// Splits a concrete shard key of this namespace into its document and date.
    ///
    /// Returns `None` for keys of another namespace or shape.
    pub fn parse<'k>(&self, key: &'k str) -> Option<(&'k str, NaiveDate)> {
        let segments: Vec<&str> = key.split(DELIMITER).collect();
        let [namespace, doc, year, month, day]: [&str; KEY_SEGMENTS] = segments.try_into().ok()?;
        if namespace != self.namespace || !is_valid_segment(doc) {
            return None;
        }
        let date = NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)?;
        Some((doc, date))
    }

    /// Returns the document segment of a concrete shard key.
    pub fn document_of<'k>(&self, key: &'k str) -> Option<&'k str> {
        self.parse(key).map(|(doc, _)| doc)
    }

    #[inline]
    fn format_key(&self, doc: &str, date: NaiveDate) -> ShardKey {
        ShardKey(format!(
            "{ns}{d}{doc}{d}{year}{d}{month}{d}{day}",
            ns = self.namespace,
            d = DELIMITER,
            year = date.year(),
            month = date.month(),
            day = date.day(),
        ))
    }
}

#[inline]
fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty() && !segment.contains(DELIMITER) && !segment.contains(WILDCARD)
}

#[inline]
fn validate_document(doc: &str) -> Result<()> {
    if is_valid_segment(doc) {
        Ok(())
    } else {
        Err(Error::InvalidDocumentId(doc.to_owned()))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use test_case::test_case;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_document_key() {
        let key = KeyBuilder::new()
            .document_key("test_document", date(2012, 6, 12))
            .unwrap();
        assert_eq!(key.as_str(), "views:test_document:2012:6:12");
    }

    #[test]
    fn test_month_pattern() {
        let pattern = KeyBuilder::new().month_pattern("test_document", 6, 2012).unwrap();
        assert_eq!(pattern.as_str(), "views:test_document:2012:6:*");
    }

    #[test]
    fn test_range_keys() {
        let keys = KeyBuilder::new()
            .range_keys("test_document", date(2012, 6, 12), date(2012, 6, 14))
            .unwrap();
        let keys: Vec<&str> = keys.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            keys,
            [
                "views:test_document:2012:6:12",
                "views:test_document:2012:6:13",
                "views:test_document:2012:6:14",
            ]
        );
    }

    #[test_case(date(2012, 6, 12), date(2012, 6, 12) => 1; "single day")]
    #[test_case(date(2012, 6, 14), date(2012, 6, 12) => 0; "inverted range")]
    #[test_case(date(2012, 2, 27), date(2012, 3, 1) => 4; "leap year month boundary")]
    #[test_case(date(2012, 12, 31), date(2013, 1, 1) => 2; "year boundary")]
    #[test_case(date(2012, 1, 1), date(2012, 12, 31) => 366; "whole leap year")]
    fn test_range_keys_len(from: NaiveDate, to: NaiveDate) -> usize {
        KeyBuilder::new().range_keys("doc", from, to).unwrap().len()
    }

    #[test]
    fn test_range_keys_cross_month() {
        let keys = KeyBuilder::new()
            .range_keys("doc", date(2012, 1, 31), date(2012, 2, 1))
            .unwrap();
        assert_eq!(keys[0].as_str(), "views:doc:2012:1:31");
        assert_eq!(keys[1].as_str(), "views:doc:2012:2:1");
    }

    #[test]
    fn test_all_documents_pattern() {
        assert_eq!(KeyBuilder::new().all_documents_pattern().as_str(), "views:*:*:*:*");
    }

    #[test]
    fn test_custom_namespace() {
        let builder = KeyBuilder::with_namespace("reads").unwrap();
        let key = builder.document_key("doc", date(2020, 1, 2)).unwrap();
        assert_eq!(key.as_str(), "reads:doc:2020:1:2");
        assert_eq!(builder.all_documents_pattern().as_str(), "reads:*:*:*:*");
        assert!(KeyBuilder::with_namespace("a:b").is_err());
    }

    #[test_case("a:b"; "delimiter")]
    #[test_case("a*"; "wildcard")]
    #[test_case(""; "empty")]
    fn test_invalid_document(doc: &str) {
        let builder = KeyBuilder::new();
        let day = date(2012, 6, 12);
        assert!(matches!(builder.document_key(doc, day), Err(Error::InvalidDocumentId(_))));
        assert!(matches!(builder.month_pattern(doc, 6, 2012), Err(Error::InvalidDocumentId(_))));
        assert!(matches!(builder.range_keys(doc, day, day), Err(Error::InvalidDocumentId(_))));
    }

    #[test_case(0; "zero")]
    #[test_case(13; "thirteen")]
    fn test_invalid_month(month: u32) {
        let result = KeyBuilder::new().month_pattern("doc", month, 2012);
        assert!(matches!(result, Err(Error::InvalidMonth(m)) if m == month));
    }

    #[test_case("views:a:2012:6:*", "views:a:2012:6:12" => true; "month wildcard")]
    #[test_case("views:a:2012:1:*", "views:a:2012:11:5" => false; "month prefix is not a match")]
    #[test_case("views:*:*:*:*", "views:b:2012:4:14" => true; "all documents")]
    #[test_case("views:*:*:*:*", "views:b:2012:4" => false; "too few segments")]
    #[test_case("views:*:*:*:*", "views:b:2012:4:14:1" => false; "too many segments")]
    #[test_case("views:a:2012:6:12", "views:a:2012:6:12" => true; "exact")]
    #[test_case("views:a:2012:6:12", "views:a:2012:6:13" => false; "exact mismatch")]
    fn test_pattern_matches(pattern: &str, key: &str) -> bool {
        pattern_matches(pattern, key)
    }

    #[test]
    fn test_parse() {
        let builder = KeyBuilder::new();
        assert_eq!(builder.parse("views:a:2012:6:12"), Some(("a", date(2012, 6, 12))));
        assert_eq!(builder.document_of("views:a:2012:6:12"), Some("a"));
        assert_eq!(builder.document_of("other:a:2012:6:12"), None);
        assert_eq!(builder.document_of("views:a:2012:6"), None);
        assert_eq!(builder.document_of("views:a:2012:2:30"), None);
    }

    #[test]
    fn test_selector_dispatch() {
        let builder = KeyBuilder::new();
        let exact: KeySelector = builder.document_key("a", date(2012, 6, 12)).unwrap().into();
        let pattern: KeySelector = builder.month_pattern("a", 6, 2012).unwrap().into();
        assert!(exact.is_exact());
        assert!(!pattern.is_exact());
        assert!(exact.matches("views:a:2012:6:12"));
        assert!(!exact.matches("views:a:2012:6:13"));
        assert!(pattern.matches("views:a:2012:6:13"));
        assert_eq!(pattern.to_string(), "views:a:2012:6:*");
    }
}
