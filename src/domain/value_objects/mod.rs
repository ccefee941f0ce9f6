//! Value Objects for the catalog feed

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

/// Remote timestamps below this are epoch seconds, at or above it milliseconds.
pub const SECONDS_THRESHOLD: i64 = 10_000_000_000;

/// Product identifier as the sources send it: WordPress ids are integers,
/// catalog ids are usually strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Number(i64),
    Text(String),
}

impl ProductId {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Self::Number).or_else(|| Some(Self::Text(n.to_string()))),
            Value::String(s) if !s.is_empty() => Some(Self::Text(s.clone())),
            _ => None,
        }
    }
}

impl Default for ProductId { fn default() -> Self { Self::Text(String::new()) } }

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::Number(n) => write!(f, "{n}"), Self::Text(s) => f.write_str(s) }
    }
}

/// SKU (Stock Keeping Unit) value object. Kept verbatim: for migrated books
/// it carries the ISBN, so no case folding.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    pub fn new(value: impl Into<String>) -> Result<Self, SkuError> {
        let value = value.into().trim().to_string();
        if value.is_empty() { return Err(SkuError::Empty); }
        Ok(Self(value))
    }
    pub fn as_str(&self) -> &str { &self.0 }
    pub fn contains_isbn(&self, isbn: &Isbn) -> bool { self.0.contains(isbn.as_str()) }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone)] pub enum SkuError { Empty }
impl std::error::Error for SkuError {}
impl fmt::Display for SkuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "SKU empty") }
}

/// 13-digit ISBN as embedded in old store paths (`/shop/9786561190732-title-816410`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Isbn(String);

impl Isbn {
    /// First 13-digit run preceded by `/` and followed by `-`.
    pub fn from_legacy_path(path: &str) -> Option<Self> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        // ASCII class on purpose: `\d` in the regex crate also matches non-ASCII digits.
        let pattern = PATTERN.get_or_init(|| Regex::new(r"/([0-9]{13})-").expect("ISBN pattern compiles"));
        pattern.captures(path).and_then(|c| c.get(1)).map(|m| Self(m.as_str().to_string()))
    }
    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Canonical product slug, routed as `/livros/{slug}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    pub fn from_title(title: &str) -> Self { Self(slugify(title)) }
    pub fn as_str(&self) -> &str { &self.0 }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Title to slug. The redirect generator and the runtime resolver both go
/// through here, so any change breaks every generated redirect rule.
///
/// Lowercase, fold `₂²₃³₄⁴` to ASCII digits, NFD and drop U+0300..=U+036F,
/// drop anything outside `[a-z0-9\s-]`, collapse whitespace/hyphen runs to a
/// single `-`, trim hyphens at both ends.
pub fn slugify(title: &str) -> String {
    let folded: String = title.to_lowercase().chars().map(fold_script_digit).collect();

    let mut slug = String::with_capacity(folded.len());
    let mut separator = false;
    for c in folded.nfd().filter(|c| !is_combining_mark(*c)) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if separator && !slug.is_empty() { slug.push('-'); }
            separator = false;
            slug.push(c);
        } else if c == '-' || is_pattern_whitespace(c) {
            separator = true;
        }
    }
    slug
}

fn fold_script_digit(c: char) -> char {
    match c {
        '₂' | '²' => '2',
        '₃' | '³' => '3',
        '₄' | '⁴' => '4',
        other => other,
    }
}

/// Replaces the subscript/superscript digits slugify folds, leaving the rest untouched.
pub fn fold_script_digits(value: &str) -> String { value.chars().map(fold_script_digit).collect() }

fn is_combining_mark(c: char) -> bool { ('\u{0300}'..='\u{036f}').contains(&c) }

/// `\s` as ECMAScript regexes define it: NEL is excluded, BOM included.
fn is_pattern_whitespace(c: char) -> bool { c == '\u{feff}' || (c.is_whitespace() && c != '\u{85}') }

/// Creation time in epoch milliseconds. Only used for ordering the feed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpochMillis(i64);

impl EpochMillis {
    pub const fn new(millis: i64) -> Self { Self(millis) }
    pub const fn value(&self) -> i64 { self.0 }
    pub fn now() -> Self { Self(Utc::now().timestamp_millis()) }

    /// WordPress reports seconds; anything below [`SECONDS_THRESHOLD`] is scaled up.
    pub fn from_remote(raw: i64) -> Self {
        if raw < SECONDS_THRESHOLD { Self(raw.saturating_mul(1000)) } else { Self(raw) }
    }

    /// RFC 3339, naive `YYYY-MM-DDTHH:MM:SS` (read as UTC), or a bare date.
    pub fn parse_date(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(Self(dt.timestamp_millis()));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(Self(naive.and_utc().timestamp_millis()));
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| Self(naive.and_utc().timestamp_millis()))
    }

    /// `2024-01-01T00:00:00.000Z` form.
    pub fn to_iso(self) -> Option<String> {
        DateTime::<Utc>::from_timestamp_millis(self.0).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl fmt::Display for EpochMillis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}
