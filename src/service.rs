//! Catalog service: what the HTTP handlers call.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::domain::aggregates::{merge_page, FeedPage, LegacyPath, PageRequest, Product, ProductSource};
use crate::domain::value_objects::{EpochMillis, ProductId};
use crate::remote::WooCommerceClient;
use crate::resolver::{LegacyResolver, Resolution};
use crate::Result;

const DEBUG_PREVIEW: usize = 3;
const PROBE_PREVIEW: usize = 10;

#[derive(Clone, Debug, Serialize)]
pub struct FeedResponse {
    #[serde(flatten)]
    pub page: FeedPage,
    #[serde(rename = "wooCommerce_count")]
    pub woocommerce_count: usize,
    pub catalog_count: usize,
    pub debug: FeedDebug,
}

#[derive(Clone, Debug, Serialize)]
pub struct FeedDebug {
    #[serde(rename = "wooCommerce_error")]
    pub woocommerce_error: Option<String>,
    pub first_products: Vec<ProductPreview>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProductPreview {
    pub title: String,
    pub source: ProductSource,
    pub date_created: Option<String>,
}

/// Result of a direct call to the remote product list, for diagnostics.
#[derive(Clone, Debug, Serialize)]
pub struct RemoteProbe {
    pub success: bool,
    pub url: String,
    pub total: usize,
    pub products: Vec<ProbeProduct>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProbeProduct {
    pub id: ProductId,
    pub title: String,
    pub slug: String,
    pub date_created: Option<String>,
    pub date_created_timestamp: EpochMillis,
}

#[derive(Debug)]
pub struct CatalogService {
    catalog: Catalog,
    remote: WooCommerceClient,
    remote_per_page: u32,
    legacy_origin: String,
    fallback_path: String,
}

impl CatalogService {
    pub fn new(catalog: Catalog, remote: WooCommerceClient, config: &Config) -> Self {
        Self {
            catalog,
            remote,
            remote_per_page: config.remote_per_page,
            legacy_origin: config.legacy_origin.clone(),
            fallback_path: config.fallback_path.clone(),
        }
    }

    pub fn fallback_path(&self) -> &str { &self.fallback_path }

    /// One page of remote + catalog products. Remote failure degrades to a
    /// catalog-only feed with the error in `debug`.
    pub async fn catalog_products(&self, request: PageRequest) -> FeedResponse {
        let catalog = self.catalog.products();
        let fetch = self.remote.recent_products(self.remote_per_page, EpochMillis::now()).await;
        let woocommerce_count = fetch.products.len();
        let catalog_count = catalog.len();

        let page = merge_page(fetch.products, catalog, request);
        let first_products = page
            .products
            .iter()
            .take(DEBUG_PREVIEW)
            .map(|p| ProductPreview { title: p.title.clone(), source: p.source, date_created: p.date_created.clone() })
            .collect();

        tracing::info!(
            total = page.total,
            woocommerce_count,
            catalog_count,
            page = page.current_page,
            per_page = page.per_page,
            in_page = page.products.len(),
            remote_error = fetch.error.as_deref().unwrap_or(""),
            "catalog feed served"
        );

        FeedResponse {
            page,
            woocommerce_count,
            catalog_count,
            debug: FeedDebug { woocommerce_error: fetch.error, first_products },
        }
    }

    pub fn catalog_product(&self, id: &str) -> Result<Product> { self.catalog.find(id) }

    pub async fn resolve_legacy(&self, path: &LegacyPath) -> Resolution {
        LegacyResolver::new(&self.remote, &self.legacy_origin, self.remote_per_page).resolve(path).await
    }

    pub async fn probe_remote(&self) -> RemoteProbe {
        let url = self.remote.products_url(self.remote_per_page, EpochMillis::now());
        match self.remote.fetch_products(self.remote_per_page).await {
            Ok(raw) => {
                let now = EpochMillis::now();
                let products: Vec<Product> = raw.into_iter().map(|r| Product::from_remote(r, now)).collect();
                RemoteProbe {
                    success: true,
                    url,
                    total: products.len(),
                    products: products
                        .into_iter()
                        .take(PROBE_PREVIEW)
                        .map(|p| ProbeProduct {
                            id: p.id,
                            title: p.title,
                            slug: p.slug,
                            date_created: p.date_created,
                            date_created_timestamp: p.date_created_timestamp,
                        })
                        .collect(),
                    error: None,
                }
            }
            Err(e) => RemoteProbe { success: false, url, total: 0, products: Vec::new(), error: Some(e.to_string()) },
        }
    }
}
