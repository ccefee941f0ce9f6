//! Catalog Feed - storefront catalog and legacy redirect service

use anyhow::{Context, Result};
use catalog_feed::{api, Catalog, CatalogService, Config, WooCommerceClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = Config::from_env()?;
    let catalog = Catalog::load(&config.catalog_path).with_context(|| format!("loading catalog from {}", config.catalog_path.display()))?;
    tracing::info!(products = catalog.len(), path = %config.catalog_path.display(), "catalog loaded");

    let remote = WooCommerceClient::new(config.api_base_url.clone(), config.remote_timeout)?;
    tracing::info!(api = %remote.base_url(), timeout_ms = config.remote_timeout.as_millis() as u64, "remote source configured");

    let app = api::router(api::AppState::new(CatalogService::new(catalog, remote, &config)));

    tracing::info!("🚀 Catalog feed listening on 0.0.0.0:{}", config.port);
    axum::serve(tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?, app).await?;
    Ok(())
}
