//! HTTP gateway for productdesk.
//!
//! Serves the embedded chat page, a health check, and the session API that
//! lets a browser submit queries and poll the coordinator's notifications.
//!
//! Built on Axum.

pub mod api;
pub mod frontend;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{Router, response::Json, routing::get};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use productdesk_agent::sales_coordinator;
use productdesk_config::{AppConfig, GatewayConfig};
use productdesk_core::event::NullNotifier;
use productdesk_providers::CompletionClient;

pub use api::{GatewayState, SharedState};

/// Build the router with every gateway route.
///
/// - `GET /health`
/// - `GET /` and `/static/*` (embedded page)
/// - `/api/*` (sessions, queries, notifications)
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .merge(api::api_router(state))
        .merge(frontend::frontend_router())
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

/// Same-origin CORS for the configured listen address.
fn cors_layer(gateway: &GatewayConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    let origin = format!("http://{}:{}", gateway.host, gateway.port);
    match HeaderValue::from_str(&origin) {
        Ok(value) => cors.allow_origin(AllowOrigin::exact(value)),
        Err(e) => {
            warn!(origin = %origin, error = %e, "Invalid CORS origin; cross-origin requests disabled");
            cors
        }
    }
}

/// Start the gateway HTTP server.
///
/// Builds the completion client and the catalog coordinator once; every
/// session shares them and only owns its notification queue.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let client = Arc::new(CompletionClient::from_config(&config)?);
    let coordinator = sales_coordinator(client, Arc::new(NullNotifier), &config.orchestrator);
    let state = Arc::new(GatewayState::new(Arc::new(coordinator)));

    let app = build_router(state).layer(cors_layer(&config.gateway));

    info!(addr = %addr, provider = %config.default_provider, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_support::test_state());

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn full_router_serves_page_and_api() {
        let state = test_support::test_state();

        let page = build_router(state.clone())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(page.status(), StatusCode::OK);

        let session = build_router(state.clone())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/session")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(session.status(), StatusCode::OK);
        assert_eq!(state.session_count().await, 1);
    }

    #[test]
    fn cors_accepts_default_origin() {
        // Building the layer must not panic for the default address.
        let _ = cors_layer(&GatewayConfig::default());
    }
}
