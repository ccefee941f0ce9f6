//! Environment configuration.
//!
//! `main` calls `dotenvy::dotenv()` first, so a local `.env` file feeds the
//! same lookup. Blank values count as unset.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8083;
pub const DEFAULT_API_BASE_URL: &str = "https://n-1.artnaweb.com.br/wp-json/n1/v1";
pub const DEFAULT_CATALOG_PATH: &str = "data/catalog-products.json";
pub const DEFAULT_LEGACY_ORIGIN: &str = "https://loja.n-1edicoes.org";
pub const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_REMOTE_PER_PAGE: u32 = 100;
pub const DEFAULT_FALLBACK_PATH: &str = "/shop";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// WooCommerce REST namespace, no trailing slash.
    pub api_base_url: String,
    pub catalog_path: PathBuf,
    /// Scheme and host of the old store, used to rebuild old absolute URLs.
    pub legacy_origin: String,
    pub remote_timeout: Duration,
    pub remote_per_page: u32,
    /// Where unresolved legacy URLs are sent.
    pub fallback_path: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a positive number, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            legacy_origin: DEFAULT_LEGACY_ORIGIN.to_string(),
            remote_timeout: Duration::from_millis(DEFAULT_REMOTE_TIMEOUT_MS),
            remote_per_page: DEFAULT_REMOTE_PER_PAGE,
            fallback_path: DEFAULT_FALLBACK_PATH.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> { Self::from_lookup(|key| std::env::var(key).ok()) }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Ok(Self {
            port: number(&get, "PORT")?.unwrap_or(defaults.port),
            api_base_url: get("API_BASE_URL").map(|v| v.trim_end_matches('/').to_string()).unwrap_or(defaults.api_base_url),
            catalog_path: get("CATALOG_PATH").map(PathBuf::from).unwrap_or(defaults.catalog_path),
            legacy_origin: get("LEGACY_STORE_ORIGIN").map(|v| v.trim_end_matches('/').to_string()).unwrap_or(defaults.legacy_origin),
            remote_timeout: number(&get, "REMOTE_TIMEOUT_MS")?.map(Duration::from_millis).unwrap_or(defaults.remote_timeout),
            remote_per_page: number(&get, "REMOTE_PER_PAGE")?.unwrap_or(defaults.remote_per_page),
            fallback_path: get("FALLBACK_PATH").unwrap_or(defaults.fallback_path),
        })
    }
}

fn number<T>(get: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    let Some(value) = get(key) else { return Ok(None) };
    match value.parse::<T>() {
        Ok(n) if n != T::default() => Ok(Some(n)),
        _ => Err(ConfigError::InvalidNumber { key, value }),
    }
}
