//! WooCommerce REST client (the `n1/v1` namespace of the WordPress plugin).

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use serde_json::Value;

use crate::domain::aggregates::{Product, RawProduct};
use crate::domain::value_objects::EpochMillis;
use crate::{CatalogError, Result};

/// Upstream error bodies are cut to this many characters in error strings.
const ERROR_BODY_CHARS: usize = 100;

#[derive(Clone, Debug)]
pub struct WooCommerceClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

/// Outcome of a feed fetch. A failure is an empty list plus the error text;
/// callers carry on with catalog data only.
#[derive(Clone, Debug, Default)]
pub struct RemoteFetch {
    pub products: Vec<Product>,
    pub error: Option<String>,
}

impl WooCommerceClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(Self { http, base_url: base_url.into().trim_end_matches('/').to_string(), timeout })
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    /// Newest first; `_t` defeats WordPress page caching.
    pub fn products_url(&self, per_page: u32, cache_bust: EpochMillis) -> String {
        format!("{}/products?per_page={per_page}&orderby=date&order=DESC&_t={cache_bust}", self.base_url)
    }

    pub fn old_url_lookup_url(&self, old_url: &str) -> String {
        format!("{}/products/old-url?url={}", self.base_url, urlencoding::encode(old_url))
    }

    /// Raw product records, envelope `{ "products": [...] }` or a bare array.
    pub async fn fetch_products(&self, per_page: u32) -> Result<Vec<RawProduct>> {
        let url = self.products_url(per_page, EpochMillis::now());
        tracing::debug!(%url, "fetching remote products");
        let body = self.get_json(&url).await?;
        Ok(product_entries(body).into_iter().map(RawProduct::from_value).collect())
    }

    /// Normalized feed products, never failing outward.
    pub async fn recent_products(&self, per_page: u32, now: EpochMillis) -> RemoteFetch {
        match self.fetch_products(per_page).await {
            Ok(raw) => {
                let products: Vec<Product> = raw.into_iter().map(|r| Product::from_remote(r, now)).collect();
                tracing::info!(count = products.len(), "remote products fetched");
                RemoteFetch { products, error: None }
            }
            Err(e) => {
                tracing::warn!(error = %e, base_url = %self.base_url, "remote products unavailable, serving catalog only");
                RemoteFetch { products: Vec::new(), error: Some(e.to_string()) }
            }
        }
    }

    /// Slug the plugin maps `old_url` to. A 404 means no mapping.
    pub async fn slug_for_old_url(&self, old_url: &str) -> Result<Option<String>> {
        match self.get_json(&self.old_url_lookup_url(old_url)).await {
            Ok(body) => Ok(body.get("slug").and_then(Value::as_str).filter(|s| !s.is_empty()).map(str::to_owned)),
            Err(CatalogError::UpstreamStatus { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self
            .http
            .get(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::UpstreamStatus { status: status.as_u16(), body: body.chars().take(ERROR_BODY_CHARS).collect() });
        }

        let body = response.text().await.map_err(|e| self.classify(e))?;
        Ok(serde_json::from_str(&body)?)
    }

    fn classify(&self, error: reqwest::Error) -> CatalogError {
        if error.is_timeout() {
            CatalogError::Timeout { after_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX) }
        } else {
            CatalogError::Transport(error)
        }
    }
}

fn product_entries(body: Value) -> Vec<Value> {
    match body {
        Value::Array(entries) => entries,
        Value::Object(mut fields) => match fields.remove("products") {
            Some(Value::Array(entries)) => entries,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
