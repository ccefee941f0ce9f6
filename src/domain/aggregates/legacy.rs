//! Legacy store URLs: parsing old `/shop/...` paths and generating the
//! old URL → `/livros/{slug}` mapping for the web server.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use url::Url;
use crate::domain::value_objects::{Isbn, Slug};

pub const LEGACY_PREFIX: &str = "/shop/";
pub const PRODUCT_ROUTE: &str = "/livros/";

/// Characters of the fuzzy fragment compared against remote slugs.
pub const FUZZY_PREFIX_CHARS: usize = 20;

/// An old store product path, query string and fragment removed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyPath(String);

impl LegacyPath {
    pub fn parse(path: &str) -> Result<Self, LegacyPathError> {
        let clean = path.split(['?', '#']).next().unwrap_or_default();
        let rest = clean.strip_prefix(LEGACY_PREFIX).ok_or(LegacyPathError::NotShopPath)?;
        if rest.trim_matches('/').is_empty() { return Err(LegacyPathError::Empty); }
        Ok(Self(clean.to_string()))
    }

    /// Path segments after `/shop/`, as a router wildcard hands them over.
    pub fn from_segments(rest: &str) -> Result<Self, LegacyPathError> {
        Self::parse(&format!("{LEGACY_PREFIX}{}", rest.trim_start_matches('/')))
    }

    pub fn as_str(&self) -> &str { &self.0 }

    pub fn absolute_url(&self, origin: &str) -> String { format!("{}{}", origin.trim_end_matches('/'), self.0) }

    pub fn isbn(&self) -> Option<Isbn> { Isbn::from_legacy_path(&self.0) }

    /// `/shop/9786561190732-ueinzz-territorio-816410` → `ueinzz-territorio-`:
    /// leading token and trailing digits dropped.
    pub fn slug_fragment(&self) -> String {
        let rest = self.0.strip_prefix(LEGACY_PREFIX).unwrap_or(&self.0);
        let without_token = rest.split('-').skip(1).collect::<Vec<_>>().join("-");
        without_token.trim_end_matches(|c: char| c.is_ascii_digit()).trim().to_string()
    }

    /// First [`FUZZY_PREFIX_CHARS`] characters of [`Self::slug_fragment`], `None` when empty.
    pub fn fuzzy_needle(&self) -> Option<String> {
        let needle: String = self.slug_fragment().chars().take(FUZZY_PREFIX_CHARS).collect();
        (!needle.is_empty()).then_some(needle)
    }
}

impl fmt::Display for LegacyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum LegacyPathError { NotShopPath, Empty }
impl std::error::Error for LegacyPathError {}
impl fmt::Display for LegacyPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self { Self::NotShopPath => write!(f, "Not a /shop/ path"), Self::Empty => write!(f, "Empty /shop/ path") }
    }
}

/// Old absolute URL, its path and the slug the product lives under now.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyUrlMapping {
    pub old_url: String,
    pub old_path: String,
    pub new_slug: Slug,
    pub title: String,
}

impl LegacyUrlMapping {
    /// `None` when no path can be extracted or the title slugs to nothing.
    pub fn from_external_url(external_url: &str, title: &str) -> Option<Self> {
        let old_path = extract_old_path(external_url)?;
        let new_slug = Slug::from_title(title);
        if new_slug.is_empty() { return None; }
        Some(Self { old_url: external_url.to_string(), old_path, new_slug, title: title.to_string() })
    }

    pub fn new_path(&self) -> String { format!("{PRODUCT_ROUTE}{}", self.new_slug) }

    /// `RewriteRule ^shop/<escaped old path>$ /livros/<slug> [R=301,L]`
    pub fn rewrite_rule(&self) -> String {
        let escaped = escape_rewrite_pattern(&self.old_path);
        let pattern = escaped.strip_prefix('/').unwrap_or(&escaped);
        format!("# {}\nRewriteRule ^{pattern}$ {} [R=301,L]\n", self.title, self.new_path())
    }
}

fn extract_old_path(external_url: &str) -> Option<String> {
    if let Ok(url) = Url::parse(external_url) {
        let mut path = url.path().to_string();
        if let Some(query) = url.query() { path.push('?'); path.push_str(query); }
        if let Some(fragment) = url.fragment() { path.push('#'); path.push_str(fragment); }
        return Some(path);
    }
    static SHOP_PATH: OnceLock<Regex> = OnceLock::new();
    let pattern = SHOP_PATH.get_or_init(|| Regex::new(r"/shop/[^?#]+").expect("shop path pattern compiles"));
    pattern.find(external_url).map(|m| m.as_str().to_string())
}

fn escape_rewrite_pattern(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if matches!(c, '.' | '*' | '+' | '?' | '^' | '$' | '{' | '}' | '(' | ')' | '|' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// mod_rewrite block with one rule per mapping, in input order.
pub fn render_rewrite_rules(mappings: &[LegacyUrlMapping]) -> String {
    let mut out = format!(
        "# Legacy store redirects to {PRODUCT_ROUTE}{{slug}}\n# Total: {}\n\n<IfModule mod_rewrite.c>\nRewriteEngine On\nRewriteBase /\n\n",
        mappings.len()
    );
    for mapping in mappings {
        out.push_str(&mapping.rewrite_rule());
        out.push('\n');
    }
    out.push_str("</IfModule>\n");
    out
}
