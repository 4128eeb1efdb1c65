use crate::api::{customers, sales};
use crate::dashboard;
use crate::query::cache::ResponseCache;
use crate::storage::store::Datastore;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
pub struct AppState {
    pub store: Datastore,
    pub cache: ResponseCache,
    pub default_limit: u64,
}

/// Build the Axum router with all routes.
pub fn build_router(state: Arc<AppState>, frontend_origin: Option<&str>) -> Router {
    let api_cors = build_api_cors(frontend_origin);

    let api_routes = Router::new()
        .route("/sales", get(sales::get_sales))
        .route("/customers", get(customers::get_customers))
        .layer(api_cors);

    Router::new()
        .route("/health", get(health_check))
        .route("/health/detailed", get(detailed_health_check))
        .nest("/api", api_routes)
        .route("/", get(dashboard::render_dashboard))
        .fallback(not_found)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(30),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build CORS layer for the API routes based on the configured origin.
fn build_api_cors(frontend_origin: Option<&str>) -> CorsLayer {
    frontend_origin.map_or_else(
        || {
            // No frontend origin configured — allow all origins.
            // Set `frontend_origin` in config to restrict cross-origin access.
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET])
                .allow_headers(Any)
        },
        |origin| {
            let allowed_origin = origin
                .parse::<axum::http::HeaderValue>()
                .unwrap_or_else(|_| axum::http::HeaderValue::from_static("*"));
            CorsLayer::new()
                .allow_origin(allowed_origin)
                .allow_methods([Method::GET])
                .allow_headers([header::CONTENT_TYPE])
        },
    )
}

/// JSON 404 for unknown routes.
async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Not found" })),
    )
}

/// GET /health — Simple health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}

/// GET /health/detailed — Detailed health check with system info.
async fn detailed_health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "dataset_ready": state.store.is_ready(),
        "cache_entries": state.cache.len(),
        "cache_empty": state.cache.is_empty(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use duckdb::Connection;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn make_test_state() -> Arc<AppState> {
        let conn = Connection::open_in_memory().unwrap();
        crate::storage::schema::init_schema(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO orders VALUES
                (1, TIMESTAMP '2024-01-10 09:00:00', '120.50', 'USD', 11),
                (2, TIMESTAMP '2024-01-25 12:00:00', '80.00', 'USD', 11),
                (3, TIMESTAMP '2024-02-03 15:30:00', '42.25', 'USD', 12);
             INSERT INTO customers VALUES
                (11, TIMESTAMP '2023-12-01 08:00:00', 'Delhi', 'India'),
                (12, TIMESTAMP '2024-02-01 10:00:00', 'Mumbai', 'India');",
        )
        .unwrap();
        Arc::new(AppState {
            store: Datastore::ready(conn),
            cache: ResponseCache::new(0),
            default_limit: 10,
        })
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = build_router(make_test_state(), None);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"ok");
    }

    #[tokio::test]
    async fn test_detailed_health_check() {
        let app = build_router(make_test_state(), None);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/detailed")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert!(json.get("version").is_some());
        assert_eq!(json["dataset_ready"], true);
        assert_eq!(json["cache_entries"], 0);
    }

    #[tokio::test]
    async fn test_sales_endpoint() {
        let app = build_router(make_test_state(), None);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/sales?byMonth")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["noOfPages"], 1);
        assert_eq!(json["data"][0]["date"], "2024-02");
        assert_eq!(json["data"][1]["totalAmount"], 200.5);
    }

    #[tokio::test]
    async fn test_dashboard_index() {
        let app = build_router(make_test_state(), None);

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let html = std::str::from_utf8(&body).unwrap();
        assert!(html.contains("<svg"));
        assert!(html.contains("Total Sales"));
    }

    #[tokio::test]
    async fn test_not_found_is_json() {
        let app = build_router(make_test_state(), None);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Not found");
    }

    #[tokio::test]
    async fn test_unready_store_returns_503() {
        let state = Arc::new(AppState {
            store: Datastore::empty(),
            cache: ResponseCache::new(0),
            default_limit: 10,
        });
        let app = build_router(state, None);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/sales?byDay")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let app = build_router(make_test_state(), Some("https://shop.example.com"));

        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/sales")
                    .header("origin", "https://shop.example.com")
                    .header("access-control-request-method", "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("https://shop.example.com")
        );
    }
}
