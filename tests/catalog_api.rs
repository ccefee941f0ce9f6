//! Integration tests for the catalog feed endpoints, with the WooCommerce API
//! replaced by a wiremock server.

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use catalog_feed::{api, Catalog, CatalogService, Config, WooCommerceClient};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Test Helpers
// =============================================================================

fn catalog() -> Catalog {
    Catalog::from_values(vec![
        json!({"_id": "catalogo-001", "title": "Pensar Gaza", "slug": "pensar-gaza"}),
        json!({"_id": "catalogo-002", "title": "H₂O e as águas do esquecimento", "slug": "h2o-e-as-aguas-do-esquecimento"}),
        json!({"_id": "catalogo-003", "title": "Ueinzz", "slug": "ueinzz"}),
    ])
}

fn app_with_timeout(base_url: &str, timeout: Duration) -> Router {
    let config = Config { api_base_url: base_url.to_string(), remote_timeout: timeout, ..Config::default() };
    let remote = WooCommerceClient::new(base_url, timeout).unwrap();
    api::router(api::AppState::new(CatalogService::new(catalog(), remote, &config)))
}

fn app(base_url: &str) -> Router {
    app_with_timeout(base_url, Duration::from_secs(5))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn titles(body: &Value) -> Vec<String> {
    body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect()
}

async fn failing_remote(status: u16, body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(&server)
        .await;
    server
}

// =============================================================================
// Feed
// =============================================================================

#[tokio::test]
async fn test_feed_merges_remote_and_catalog_by_date() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("per_page", "100"))
        .and(query_param("orderby", "date"))
        .and(query_param("order", "DESC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [
                {"id": 901, "_id": "901", "title": "Antigo", "slug": "antigo", "date_created": "2020-01-01T00:00:00"},
                {"id": 902, "_id": "902", "title": "Novo", "slug": "novo", "sku": "9786561199999", "date_created_timestamp": 1_750_000_000}
            ]
        })))
        .expect(3)
        .mount(&server)
        .await;

    let (status, body) = get_json(app(&server.uri()), "/api/catalog-products?page=1&per_page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Novo", "Pensar Gaza"]);
    assert_eq!(body["total"], json!(5));
    assert_eq!(body["pages"], json!(3));
    assert_eq!(body["current_page"], json!(1));
    assert_eq!(body["per_page"], json!(2));
    assert_eq!(body["wooCommerce_count"], json!(2));
    assert_eq!(body["catalog_count"], json!(3));
    assert_eq!(body["debug"]["wooCommerce_error"], Value::Null);
    assert_eq!(body["products"][0]["source"], json!("woocommerce"));
    assert_eq!(body["products"][0]["date_created_timestamp"], json!(1_750_000_000_000_i64));
    assert_eq!(body["products"][1]["source"], json!("catalog"));
    assert_eq!(body["products"][1]["date_created_timestamp"], json!(1_704_067_200_000_i64));
    assert_eq!(body["debug"]["first_products"][0]["title"], json!("Novo"));

    let mut all = titles(&body);
    for page in 2..=3 {
        let (_, body) = get_json(app(&server.uri()), &format!("/api/catalog-products?page={page}&per_page=2")).await;
        all.extend(titles(&body));
    }
    assert_eq!(all, vec!["Novo", "Pensar Gaza", "H₂O e as águas do esquecimento", "Ueinzz", "Antigo"]);
}

#[tokio::test]
async fn test_feed_degrades_on_upstream_error() {
    let server = failing_remote(500, "boom").await;

    let (status, body) = get_json(app(&server.uri()), "/api/catalog-products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["wooCommerce_count"], json!(0));
    assert_eq!(body["catalog_count"], json!(3));
    assert_eq!(body["total"], json!(3));
    assert_eq!(body["pages"], json!(1));
    assert_eq!(body["debug"]["wooCommerce_error"], json!("HTTP 500: boom"));
    assert_eq!(titles(&body), vec!["Pensar Gaza", "H₂O e as águas do esquecimento", "Ueinzz"]);
}

#[tokio::test]
async fn test_feed_truncates_long_error_bodies() {
    let server = failing_remote(502, &"x".repeat(500)).await;

    let (_, body) = get_json(app(&server.uri()), "/api/catalog-products").await;
    let error = body["debug"]["wooCommerce_error"].as_str().unwrap();
    assert_eq!(error, format!("HTTP 502: {}", "x".repeat(100)));
}

#[tokio::test]
async fn test_feed_degrades_on_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": []})).set_delay(Duration::from_millis(1500)))
        .mount(&server)
        .await;

    let (status, body) = get_json(app_with_timeout(&server.uri(), Duration::from_millis(100)), "/api/catalog-products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["wooCommerce_count"], json!(0));
    assert_eq!(body["total"], json!(3));
    assert_eq!(body["debug"]["wooCommerce_error"], json!("Request timed out after 100 ms"));
}

#[tokio::test]
async fn test_feed_degrades_on_invalid_json() {
    let server = failing_remote(200, "<html>maintenance</html>").await;

    let (_, body) = get_json(app(&server.uri()), "/api/catalog-products").await;
    assert_eq!(body["wooCommerce_count"], json!(0));
    assert!(body["debug"]["wooCommerce_error"].as_str().unwrap().starts_with("Invalid JSON from remote"));
}

#[tokio::test]
async fn test_feed_degrades_when_unreachable() {
    let (status, body) = get_json(app_with_timeout("http://127.0.0.1:9", Duration::from_millis(500)), "/api/catalog-products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["wooCommerce_count"], json!(0));
    assert_eq!(body["total"], json!(3));
    assert!(body["debug"]["wooCommerce_error"].is_string());
}

#[tokio::test]
async fn test_feed_page_beyond_end() {
    let server = failing_remote(503, "down").await;

    let (status, body) = get_json(app(&server.uri()), "/api/catalog-products?page=5&per_page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"], json!([]));
    assert_eq!(body["total"], json!(3));
    assert_eq!(body["pages"], json!(2));
    assert_eq!(body["current_page"], json!(5));
}

#[tokio::test]
async fn test_feed_bad_pagination_params() {
    let server = failing_remote(503, "down").await;

    let (status, body) = get_json(app(&server.uri()), "/api/catalog-products?page=abc&per_page=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_page"], json!(1));
    assert_eq!(body["per_page"], json!(1));
    assert_eq!(body["pages"], json!(3));
    assert_eq!(titles(&body), vec!["Pensar Gaza"]);
}

// =============================================================================
// Single product, probe, health
// =============================================================================

#[tokio::test]
async fn test_catalog_product_lookup() {
    let app = app("http://127.0.0.1:9");

    let (status, body) = get_json(app.clone(), "/api/catalog-products/h%E2%82%82o-e-as-aguas-do-esquecimento").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["_id"], json!("catalogo-002"));
    assert_eq!(body["source"], json!("catalog"));

    let (status, body) = get_json(app.clone(), "/api/catalog-products/CATALOGO-003").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], json!("Ueinzz"));

    let (status, body) = get_json(app, "/api/catalog-products/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Product not found"));
}

#[tokio::test]
async fn test_probe_summarizes_remote() {
    let server = MockServer::start().await;
    let products: Vec<Value> = (0..12)
        .map(|i| json!({"id": i, "title": format!("Livro {i}"), "slug": format!("livro-{i}"), "date_created_timestamp": 1_700_000_000 + i}))
        .collect();
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"products": products})))
        .mount(&server)
        .await;

    let (status, body) = get_json(app(&server.uri()), "/api/test-woocommerce").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["total"], json!(12));
    assert_eq!(body["products"].as_array().unwrap().len(), 10);
    assert_eq!(body["products"][0]["date_created_timestamp"], json!(1_700_000_000_000_i64));
    assert!(body["url"].as_str().unwrap().starts_with(&format!("{}/products?per_page=100", server.uri())));
}

#[tokio::test]
async fn test_probe_reports_failure() {
    let server = failing_remote(401, "unauthorized").await;

    let (status, body) = get_json(app(&server.uri()), "/api/test-woocommerce").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("HTTP 401: unauthorized"));
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get_json(app("http://127.0.0.1:9"), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
}
