//! HTTP surface.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::domain::aggregates::{LegacyPath, PageRequest, Product};
use crate::resolver::Resolution;
use crate::service::{CatalogService, FeedResponse, RemoteProbe};
use crate::CatalogError;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CatalogService>,
}

impl AppState {
    pub fn new(service: CatalogService) -> Self { Self { service: Arc::new(service) } }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "catalog-feed"})) }))
        .route("/api/catalog-products", get(list_catalog_products))
        .route("/api/catalog-products/:id", get(get_catalog_product))
        .route("/api/test-woocommerce", get(probe_woocommerce))
        .route("/shop/*path", get(legacy_redirect))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Kept as strings so a malformed value falls back to defaults instead of a 400.
#[derive(Debug, Deserialize)]
pub struct ListParams { pub page: Option<String>, pub per_page: Option<String> }

async fn list_catalog_products(State(s): State<AppState>, Query(p): Query<ListParams>) -> Json<FeedResponse> {
    let request = PageRequest::parse(p.page.as_deref(), p.per_page.as_deref());
    Json(s.service.catalog_products(request).await)
}

async fn get_catalog_product(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<Product>, (StatusCode, Json<serde_json::Value>)> {
    s.service.catalog_product(&id).map(Json).map_err(|e| {
        let status = match e { CatalogError::ProductNotFound => StatusCode::NOT_FOUND, _ => StatusCode::INTERNAL_SERVER_ERROR };
        (status, Json(serde_json::json!({"error": e.to_string()})))
    })
}

async fn probe_woocommerce(State(s): State<AppState>) -> Json<RemoteProbe> { Json(s.service.probe_remote().await) }

/// Resolved products get a permanent redirect; misses a temporary one to the
/// listing, so a product imported later can still take over the old URL.
async fn legacy_redirect(State(s): State<AppState>, Path(path): Path<String>) -> Response {
    let Ok(legacy) = LegacyPath::from_segments(&path) else {
        return Redirect::temporary(s.service.fallback_path()).into_response();
    };
    let resolution = s.service.resolve_legacy(&legacy).await;
    let target = resolution.redirect_target(s.service.fallback_path());
    match resolution {
        Resolution::Resolved { .. } => Redirect::permanent(&target).into_response(),
        Resolution::Unresolved => Redirect::temporary(&target).into_response(),
    }
}
