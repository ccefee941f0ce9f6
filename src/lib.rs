//! Catalog Feed
//!
//! Storefront backend for a publishing house: merges the bundled static
//! catalog with the live WooCommerce API and redirects old store URLs.
//!
//! ## Features
//! - Unified, date-ordered product feed across both sources
//! - Degraded catalog-only mode when the remote API is unreachable
//! - Legacy `/shop/...` URL resolution to `/livros/{slug}`
//! - Redirect rule generation for the old store

pub mod api;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod remote;
pub mod resolver;
pub mod service;

use thiserror::Error;

pub use catalog::Catalog;
pub use config::{Config, ConfigError};
pub use domain::aggregates::{FeedPage, LegacyPath, LegacyUrlMapping, PageRequest, Product, ProductSource};
pub use domain::value_objects::{slugify, EpochMillis, Isbn, Sku, Slug};
pub use remote::WooCommerceClient;
pub use resolver::{LegacyResolver, Resolution, Strategy};
pub use service::{CatalogService, FeedResponse};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Product not found")]
    ProductNotFound,

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    #[error("HTTP {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("Invalid JSON from remote: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Catalog file error: {0}")]
    CatalogFile(#[from] std::io::Error),

    #[error("Catalog file is not a JSON array of products: {0}")]
    CatalogFormat(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
