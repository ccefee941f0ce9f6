//! Aggregates module
pub mod product;
pub mod feed;
pub mod legacy;

pub use product::{Product, ProductSource, RawProduct, CATALOG_BASE_EPOCH, PLACEHOLDER_IMAGE};
pub use feed::{merge_page, FeedPage, PageRequest};
pub use legacy::{render_rewrite_rules, LegacyPath, LegacyPathError, LegacyUrlMapping};
