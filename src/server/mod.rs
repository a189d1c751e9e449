//! HTTP API.
//!
//! Routes:
//! - `/`, `/health` - service info and liveness
//! - `/api/cctv/list`, `/api/cctv/nearby`, `/api/cctv/refresh` - directory
//! - `/api/cctv/:cctvId` - stream locator for one camera
//! - `/api/cache/status`, `/api/debug/cache`, `/api/debug/routes` - inspection
//! - `/api/proxy` - media relay
//!
//! Anything else gets a 404 envelope listing the endpoints. Every response,
//! errors included, carries permissive CORS headers, and preflights for any
//! route are answered by the CORS layer.

mod error;
mod handlers;
mod middleware;
mod types;

use std::sync::Arc;

use anyhow::Context;
use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};

use crate::service::CctvService;
use handlers::{
    cache_status_handler, debug_cache_handler, health_handler, list_handler, nearby_handler,
    not_found_handler, proxy_handler, refresh_handler, root_handler, routes_handler,
    stream_handler,
};

pub use error::ApiError;
pub use types::{AppState, ENDPOINTS};

/// Builds the router over a shared service.
pub fn router(service: Arc<CctvService>) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/cctv/list", get(list_handler))
        .route("/api/cctv/nearby", get(nearby_handler))
        .route("/api/cctv/refresh", post(refresh_handler))
        .route("/api/cctv/:cctvId", get(stream_handler))
        .route("/api/cache/status", get(cache_status_handler))
        .route("/api/debug/cache", get(debug_cache_handler))
        .route("/api/debug/routes", get(routes_handler))
        .route("/api/proxy", get(proxy_handler))
        .fallback(not_found_handler)
        .layer(cors_layer())
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .with_state(service)
}

/// Any origin, the methods the API uses, and `Content-Type`.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Binds `bind:port` and serves until `shutdown` is cancelled.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(
    bind: &str,
    port: u16,
    service: Arc<CctvService>,
    shutdown: CancellationToken,
) -> Result<(), anyhow::Error> {
    let addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server to {}", addr))?;

    log::info!("Listening on http://{}/", addr);
    log::info!("  - Directory: http://{}/api/cctv/list", addr);
    log::info!("  - Health: http://{}/health", addr);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("HTTP server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::directory::DirectoryStore;
    use crate::models::RawProviderRecord;
    use crate::provider::test_helpers::{csv_directory, FakeProvider};
    use crate::provider::Provider;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app(provider: FakeProvider) -> Router {
        let service = CctvService::with_provider(
            &Config {
                api_key: "test-key".to_string(),
                ..Default::default()
            },
            Arc::new(provider) as Arc<dyn Provider>,
            DirectoryStore::in_memory(),
        )
        .expect("service should build");
        router(Arc::new(service))
    }

    fn directory() -> Vec<u8> {
        csv_directory(&[
            ("L933073", "서울 마포 성산교", "KBS 재난포털", 37.5665, 126.9780),
            ("E911789", "서해안선 목감IC", "국가교통정보센터", 37.2636, 126.8226),
        ])
    }

    async fn call(app: Router, method: Method, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body should be JSON")
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_list_fills_empty_directory() {
        let (status, body) = call(app(FakeProvider::new().with_directory(directory())), Method::GET, "/api/cctv/list").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 2);
        assert_eq!(body["cached"], true);
        assert_eq!(body["data"][0]["id"], "L933073");
        assert!(body["lastUpdated"].is_string());
    }

    #[tokio::test]
    async fn test_nearby_requires_coordinates() {
        let (status, body) = call(app(FakeProvider::new()), Method::GET, "/api/cctv/nearby?lng=127").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["required"], serde_json::json!(["lat", "lng"]));
    }

    #[tokio::test]
    async fn test_nearby_envelope() {
        let (status, body) = call(
            app(FakeProvider::new().with_directory(directory())),
            Method::GET,
            "/api/cctv/nearby?lat=37.5665&lng=126.9780&radius=3",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["id"], "L933073");
        assert_eq!(body["data"][0]["distance"], 0.0);
        assert_eq!(body["userLocation"]["lat"], 37.5665);
        assert_eq!(body["radius"], 3.0);
        assert_eq!(body["debug"]["totalCctv"], 2);
    }

    #[tokio::test]
    async fn test_stream_route_resolves() {
        let metadata: RawProviderRecord = [
            ("CCTVID", "E911789"),
            ("CCTVNAME", "서해안선 목감IC"),
            ("KIND", "KB"),
            ("XCOORD", "126.8226"),
            ("YCOORD", "37.2636"),
        ]
        .into_iter()
        .collect();
        let (status, body) = call(
            app(FakeProvider::new().with_metadata("E911789", metadata)),
            Method::GET,
            "/api/cctv/E911789",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cctvId"], "E911789");
        assert_eq!(body["kind"], "KB");
        assert_eq!(body["playerType"], "webview");
        assert_eq!(body["directVideoUrl"], Value::Null);
        assert_eq!(body["location"]["lat"], "37.2636");
        assert_eq!(body["metadata"]["CCTVNAME"], "서해안선 목감IC");
        let url = body["streamUrl"].as_str().expect("stream url");
        assert!(url.starts_with("https://www.utic.go.kr/jsp/map/openDataCctvStream.jsp?key=test-key&cctvid=E911789&"));
    }

    #[tokio::test]
    async fn test_rejected_stream_is_forbidden() {
        let metadata: RawProviderRecord = [("code", "9999"), ("msg", "비정상적인 접근입니다")]
            .into_iter()
            .collect();
        let (status, body) = call(
            app(FakeProvider::new().with_metadata("L933113", metadata)),
            Method::GET,
            "/api/cctv/L933113",
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);
        assert_eq!(body["cctvId"], "L933113");
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_bad_gateway() {
        let (status, body) = call(app(FakeProvider::new()), Method::GET, "/api/cctv/E1").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["cctvId"], "E1");
    }

    #[tokio::test]
    async fn test_refresh_reports_fallback() {
        let (status, body) = call(app(FakeProvider::new()), Method::POST, "/api/cctv/refresh").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 8);
        assert_eq!(body["lastUpdated"], Value::Null);
    }

    #[tokio::test]
    async fn test_cache_status_and_debug() {
        let (status, body) = call(app(FakeProvider::new()), Method::GET, "/api/cache/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);
        assert_eq!(body["isValid"], false);
        assert_eq!(body["isLoading"], false);

        let (status, body) = call(app(FakeProvider::new()), Method::GET, "/api/debug/cache").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["cache"]["sampleData"], serde_json::json!([]));
        assert_eq!(body["cache"]["count"], 0);
    }

    #[tokio::test]
    async fn test_unknown_route_lists_endpoints() {
        let (status, body) = call(app(FakeProvider::new()), Method::GET, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["url"], "/nope");
        let endpoints = body["availableEndpoints"].as_array().expect("endpoint list");
        assert_eq!(endpoints.len(), ENDPOINTS.len());
        assert!(endpoints.iter().any(|e| e == "GET /api/cctv/nearby"));
    }

    #[tokio::test]
    async fn test_info_routes() {
        let (status, body) = call(app(FakeProvider::new()), Method::GET, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "cctv_proxy");

        let (status, body) = call(app(FakeProvider::new()), Method::GET, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["cache"]["count"], 0);

        let (_, body) = call(app(FakeProvider::new()), Method::GET, "/api/debug/routes").await;
        let proxy = body["routes"]
            .as_array()
            .expect("routes")
            .iter()
            .find(|r| r["path"] == "/api/proxy")
            .expect("proxy route listed");
        assert_eq!(proxy["methods"], serde_json::json!(["GET"]));
    }

    #[tokio::test]
    async fn test_proxy_validation() {
        let (status, body) = call(app(FakeProvider::new()), Method::GET, "/api/proxy?url=ftp%3A%2F%2Fhost%2Ff").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = call(app(FakeProvider::new()), Method::GET, "/api/proxy").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            app(FakeProvider::new()),
            Method::GET,
            "/api/proxy?url=http%3A%2F%2F127.0.0.1%3A8080%2Flive.m3u8",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    async fn cross_origin(app: Router, request: Request<Body>) -> axum::response::Response {
        app.oneshot(request).await.expect("router is infallible")
    }

    #[tokio::test]
    async fn test_cors_headers_on_json_and_error_responses() {
        for (uri, expected) in [
            ("/api/cctv/list", StatusCode::OK),
            ("/api/cctv/nearby?lng=127", StatusCode::BAD_REQUEST),
            ("/api/proxy", StatusCode::BAD_REQUEST),
            ("/nope", StatusCode::NOT_FOUND),
        ] {
            let response = cross_origin(
                app(FakeProvider::new().with_directory(directory())),
                Request::builder()
                    .uri(uri)
                    .header(header::ORIGIN, "https://map.example.com")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await;
            assert_eq!(response.status(), expected, "{}", uri);
            assert_eq!(
                response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
                "*",
                "{}",
                uri
            );
        }
    }

    #[tokio::test]
    async fn test_preflight_is_answered_for_any_route() {
        for uri in ["/api/cctv/nearby", "/api/proxy", "/api/cctv/refresh"] {
            let response = cross_origin(
                app(FakeProvider::new()),
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri(uri)
                    .header(header::ORIGIN, "https://map.example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                    .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await;
            assert!(response.status().is_success(), "{} -> {}", uri, response.status());
            let headers = response.headers();
            assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
            let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS]
                .to_str()
                .expect("ascii header");
            assert!(methods.contains("GET") && methods.contains("POST"), "{}", methods);
            let allowed = headers[header::ACCESS_CONTROL_ALLOW_HEADERS]
                .to_str()
                .expect("ascii header");
            assert!(allowed.eq_ignore_ascii_case("content-type"), "{}", allowed);
            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .expect("body should be readable");
            assert!(body.is_empty());
        }
    }
}
