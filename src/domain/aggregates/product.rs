//! Product Aggregate
//!
//! One view-model for both sources. Raw records are read leniently at the
//! boundary ([`RawProduct::from_value`]) so a malformed entry degrades to
//! fallback values instead of failing the feed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use crate::domain::value_objects::{EpochMillis, ProductId, Sku};

/// 2024-01-01T00:00:00Z. Catalog entries without a timestamp are dated just
/// before this, so any live remote product sorts ahead of them.
pub const CATALOG_BASE_EPOCH: EpochMillis = EpochMillis::new(1_704_067_200_000);

/// Gap between consecutive synthetic catalog timestamps.
pub const CATALOG_STEP_MILLIS: i64 = 1000;

pub const PLACEHOLDER_IMAGE: &str = "/assets/img/product/placeholder.png";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductSource {
    #[default]
    Catalog,
    WooCommerce,
}

/// A source record before normalization. Fields the feed does not interpret
/// are kept in `extra` and written back out untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawProduct {
    pub id: Option<ProductId>,
    pub legacy_id: Option<ProductId>,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub sku: Option<String>,
    pub image: Option<String>,
    pub date_created: Option<String>,
    pub date_created_timestamp: Option<i64>,
    pub extra: Map<String, Value>,
}

impl RawProduct {
    /// Never fails: fields of an unexpected type are dropped and a non-object
    /// entry becomes an empty record.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut fields) = value else { return Self::default() };
        let id = fields.remove("id");
        let legacy_id = fields.remove("_id");
        fields.remove("source");
        Self {
            id: id.as_ref().and_then(ProductId::from_value),
            legacy_id: legacy_id.as_ref().and_then(ProductId::from_value),
            title: text_field(fields.remove("title")),
            slug: text_field(fields.remove("slug")),
            sku: text_field(fields.remove("sku")),
            image: text_field(fields.remove("image")),
            date_created: text_field(fields.remove("date_created")),
            date_created_timestamp: timestamp_field(fields.remove("date_created_timestamp")),
            extra: fields,
        }
    }
}

fn text_field(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Positive integer, float or numeric string; zero counts as missing.
fn timestamp_field(value: Option<Value>) -> Option<i64> {
    let millis = match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    }?;
    (millis > 0).then_some(millis)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub key: String,
    pub id: ProductId,
    pub title: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    pub image: String,
    pub source: ProductSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
    pub date_created_timestamp: EpochMillis,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Catalog entry at `index`. Keeps an existing timestamp, otherwise dates
    /// it `CATALOG_BASE_EPOCH - index * 1s`; a pure function of position.
    /// A missing `date_created` is always derived from the position.
    pub fn from_catalog(raw: RawProduct, index: usize) -> Self {
        let synthetic = synthetic_timestamp(index);
        let timestamp = raw.date_created_timestamp.map(EpochMillis::new).unwrap_or(synthetic);
        let date_created = raw.date_created.clone().or_else(|| synthetic.to_iso());
        Self::assemble(raw, ProductSource::Catalog, timestamp, date_created)
    }

    /// Remote entry. Timestamp falls back from `date_created_timestamp`
    /// (seconds or millis) to `date_created` to `now`.
    pub fn from_remote(raw: RawProduct, now: EpochMillis) -> Self {
        let timestamp = raw
            .date_created_timestamp
            .map(EpochMillis::from_remote)
            .or_else(|| raw.date_created.as_deref().and_then(EpochMillis::parse_date))
            .unwrap_or(now);
        let date_created = raw.date_created.clone();
        Self::assemble(raw, ProductSource::WooCommerce, timestamp, date_created)
    }

    fn assemble(raw: RawProduct, source: ProductSource, timestamp: EpochMillis, date_created: Option<String>) -> Self {
        let id = raw.id.or_else(|| raw.legacy_id.clone()).unwrap_or_default();
        let key = raw.legacy_id.map(|k| k.to_string()).unwrap_or_else(|| id.to_string());
        Self {
            key,
            id,
            title: raw.title.unwrap_or_default(),
            slug: raw.slug.unwrap_or_default(),
            sku: raw.sku.and_then(|s| Sku::new(s).ok()),
            image: raw.image.unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            source,
            date_created,
            date_created_timestamp: timestamp,
            extra: raw.extra,
        }
    }
}

pub fn synthetic_timestamp(index: usize) -> EpochMillis {
    let offset = i64::try_from(index).unwrap_or(i64::MAX).saturating_mul(CATALOG_STEP_MILLIS);
    EpochMillis::new(CATALOG_BASE_EPOCH.value().saturating_sub(offset))
}
