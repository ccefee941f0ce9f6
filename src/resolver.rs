//! Legacy store URL resolution.
//!
//! An old `/shop/...` path is tried against [`Strategy::CASCADE`] in order
//! and the first strategy producing a slug wins. A failing strategy (network
//! error included) only moves the cascade on.

use std::fmt;

use crate::domain::aggregates::{LegacyPath, Product};
use crate::domain::aggregates::legacy::PRODUCT_ROUTE;
use crate::domain::value_objects::{EpochMillis, Isbn};
use crate::remote::WooCommerceClient;
use crate::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Plugin lookup by the full old absolute URL.
    ExactUrl,
    /// ISBN from the path found inside a remote SKU.
    Isbn,
    /// Leading part of the old title slug found inside a remote slug.
    FuzzySlug,
}

impl Strategy {
    pub const CASCADE: [Strategy; 3] = [Strategy::ExactUrl, Strategy::Isbn, Strategy::FuzzySlug];

    pub fn name(self) -> &'static str {
        match self {
            Self::ExactUrl => "exact_url",
            Self::Isbn => "isbn",
            Self::FuzzySlug => "fuzzy_slug",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Resolved { slug: String, strategy: Strategy },
    Unresolved,
}

impl Resolution {
    /// Slugs come from the remote API and are percent-encoded, so the target
    /// is always a valid `Location` header value.
    pub fn redirect_target(&self, fallback: &str) -> String {
        match self {
            Self::Resolved { slug, .. } => format!("{PRODUCT_ROUTE}{}", urlencoding::encode(slug)),
            Self::Unresolved => fallback.to_string(),
        }
    }
}

pub struct LegacyResolver<'a> {
    remote: &'a WooCommerceClient,
    origin: &'a str,
    per_page: u32,
}

impl<'a> LegacyResolver<'a> {
    pub fn new(remote: &'a WooCommerceClient, origin: &'a str, per_page: u32) -> Self { Self { remote, origin, per_page } }

    pub async fn resolve(&self, path: &LegacyPath) -> Resolution {
        // Remote listing shared by the ISBN and fuzzy steps, fetched at most once.
        let mut listing: Option<Vec<Product>> = None;

        for strategy in Strategy::CASCADE {
            match self.attempt(strategy, path, &mut listing).await {
                Ok(Some(slug)) => {
                    tracing::info!(path = %path, %strategy, %slug, "legacy url resolved");
                    return Resolution::Resolved { slug, strategy };
                }
                Ok(None) => tracing::debug!(path = %path, %strategy, "no match"),
                Err(e) => tracing::warn!(path = %path, %strategy, error = %e, "strategy failed"),
            }
        }

        tracing::info!(path = %path, "legacy url unresolved");
        Resolution::Unresolved
    }

    async fn attempt(&self, strategy: Strategy, path: &LegacyPath, listing: &mut Option<Vec<Product>>) -> Result<Option<String>> {
        match strategy {
            Strategy::ExactUrl => self.remote.slug_for_old_url(&path.absolute_url(self.origin)).await,
            Strategy::Isbn => {
                let Some(isbn) = path.isbn() else { return Ok(None) };
                Ok(match_isbn(self.listing(listing).await?, &isbn))
            }
            Strategy::FuzzySlug => {
                let Some(needle) = path.fuzzy_needle() else { return Ok(None) };
                Ok(match_slug_fragment(self.listing(listing).await?, &needle))
            }
        }
    }

    async fn listing<'c>(&self, cache: &'c mut Option<Vec<Product>>) -> Result<&'c [Product]> {
        if cache.is_none() {
            let fetched = self.remote.fetch_products(self.per_page).await;
            let now = EpochMillis::now();
            let (products, outcome) = match fetched {
                Ok(raw) => (raw.into_iter().map(|r| Product::from_remote(r, now)).collect(), Ok(())),
                Err(e) => (Vec::new(), Err(e)),
            };
            *cache = Some(products);
            outcome?;
        }
        Ok(cache.as_deref().unwrap_or_default())
    }
}

/// First product whose SKU contains the ISBN and that has a slug to redirect to.
pub fn match_isbn(products: &[Product], isbn: &Isbn) -> Option<String> {
    products
        .iter()
        .find(|p| !p.slug.is_empty() && p.sku.as_ref().is_some_and(|sku| sku.contains_isbn(isbn)))
        .map(|p| p.slug.clone())
}

pub fn match_slug_fragment(products: &[Product], needle: &str) -> Option<String> {
    products.iter().find(|p| !p.slug.is_empty() && p.slug.contains(needle)).map(|p| p.slug.clone())
}
