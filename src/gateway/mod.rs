//! HTTP gateway: health, template drafting and ticket creation.

pub mod config;
pub mod template;
pub mod tracker;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::error::GatewayError;

use self::config::GatewayConfig;

pub const HTML_HINT: &str = "The access layer rejected the service credentials. Check CF_ACCESS_CLIENT_ID and CF_ACCESS_CLIENT_SECRET.";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config: Arc::new(config),
            http: reqwest::Client::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            GatewayError::MissingConfig { missing, configured } => {
                let configured: serde_json::Map<String, serde_json::Value> = configured
                    .into_iter()
                    .map(|(name, present)| (name.to_string(), present.into()))
                    .collect();
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "Missing required configuration",
                        "details": { "missing": missing, "configured": configured },
                    }),
                )
            }
            GatewayError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            GatewayError::HtmlResponse { status } => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": "Received an HTML login page from the access layer instead of JSON",
                    "details": { "hint": HTML_HINT, "upstreamStatus": status },
                }),
            ),
            GatewayError::Upstream { status, details } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                json!({ "error": "Failed to create ticket", "details": details }),
            ),
            e @ (GatewayError::Transport(_) | GatewayError::Malformed(_)) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": "Upstream request failed", "details": e.to_string() }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/generate-comm-template", post(template::generate_comm_template))
        .route("/api/jira/create-ticket", post(tracker::create_ticket))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn run_serve(config: GatewayConfig, bind: &str, port: u16) -> Result<()> {
    let app = build_router(AppState::new(config));
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("wop serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("wop serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for Ctrl+C");
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().timestamp_millis(),
    }))
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "API endpoint not found")
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;

    fn tracker_env(domain: &str) -> GatewayConfig {
        let domain = domain.to_string();
        GatewayConfig::from_lookup(move |name| match name {
            "JIRA_DOMAIN" => Some(domain.clone()),
            "CF_ACCESS_CLIENT_ID" => Some("cid".into()),
            "CF_ACCESS_CLIENT_SECRET" => Some("csecret".into()),
            "JIRA_EMAIL" => Some("ops@acme.test".into()),
            "JIRA_API_TOKEN" => Some("tok".into()),
            _ => None,
        })
    }

    async fn send(config: GatewayConfig, method: &str, uri: &str, body: serde_json::Value) -> Response {
        let app = build_router(AppState::new(config));
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(if method == "GET" { Body::empty() } else { Body::from(body.to_string()) })
            .unwrap();
        app.oneshot(request).await.unwrap()
    }

    /// Send a raw body, with an optional content type.
    async fn send_raw(uri: &str, content_type: Option<&str>, body: &'static str) -> Response {
        let app = build_router(AppState::new(tracker_env("acme.atlassian.net")));
        let mut request = Request::builder().method("POST").uri(uri);
        if let Some(content_type) = content_type {
            request = request.header("content-type", content_type);
        }
        app.oneshot(request.body(Body::from(body)).unwrap()).await.unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), 1_048_576)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let resp = send(GatewayConfig::default(), "GET", "/api/health", json!(null)).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["status"], "ok");
        assert!(json["timestamp"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let resp = send(GatewayConfig::default(), "GET", "/api/nope", json!(null)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"API endpoint not found");
    }

    #[tokio::test]
    async fn test_template_requires_task_text() {
        let resp = send(
            GatewayConfig::default(),
            "POST",
            "/api/generate-comm-template",
            json!({ "taskText": "  " }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await, json!({ "error": "Task text is required" }));
    }

    #[tokio::test]
    async fn test_template_reports_missing_model_config() {
        let resp = send(
            GatewayConfig::default(),
            "POST",
            "/api/generate-comm-template",
            json!({ "taskText": "Weekly update" }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "Missing required configuration");
        assert_eq!(json["details"]["missing"], json!(["AI_ACCOUNT_ID", "AI_API_TOKEN"]));
    }

    #[tokio::test]
    async fn test_template_upstream_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", mockito::Matcher::Any)
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;
        let url = server.url();
        let config = GatewayConfig::from_lookup(move |name| match name {
            "AI_ACCOUNT_ID" => Some("acct".into()),
            "AI_API_TOKEN" => Some("tok".into()),
            "AI_BASE_URL" => Some(url.clone()),
            _ => None,
        });

        let resp = send(config, "POST", "/api/generate-comm-template", json!({ "taskText": "Demo" })).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Failed to generate template");
    }

    #[tokio::test]
    async fn test_ticket_requires_project_and_summary() {
        let resp = send(
            tracker_env("acme.atlassian.net"),
            "POST",
            "/api/jira/create-ticket",
            json!({ "project": "OPS" }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"], "project and summary are required");
    }

    #[tokio::test]
    async fn test_ticket_reports_missing_config() {
        let config = GatewayConfig::from_lookup(|name| match name {
            "JIRA_DOMAIN" => Some("acme.atlassian.net".into()),
            "JIRA_EMAIL" => Some("ops@acme.test".into()),
            _ => None,
        });
        let resp = send(
            config,
            "POST",
            "/api/jira/create-ticket",
            json!({ "project": "OPS", "summary": "Book venue" }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(
            json["details"]["missing"],
            json!(["CF_ACCESS_CLIENT_ID", "CF_ACCESS_CLIENT_SECRET", "JIRA_API_TOKEN"])
        );
        assert_eq!(json["details"]["configured"]["JIRA_DOMAIN"], true);
        assert_eq!(json["details"]["configured"]["JIRA_API_TOKEN"], false);
    }

    #[tokio::test]
    async fn test_ticket_created() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/api/3/issue")
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"10001","key":"OPS-42","self":"https://acme/rest/api/3/issue/10001"}"#)
            .create_async()
            .await;

        let resp = send(
            tracker_env(&server.url()),
            "POST",
            "/api/jira/create-ticket",
            json!({ "project": "OPS", "summary": "Book venue", "description": "Room for 20" }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let json = body_json(resp).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["ticket"]["key"], "OPS-42");
        assert_eq!(json["ticket"]["url"], format!("{}/browse/OPS-42", server.url()));
        assert_eq!(json["ticket"]["self"], "https://acme/rest/api/3/issue/10001");
    }

    #[tokio::test]
    async fn test_ticket_html_response_becomes_json_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/api/3/issue")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<!DOCTYPE html><html><body>Sign in</body></html>")
            .create_async()
            .await;

        let resp = send(
            tracker_env(&server.url()),
            "POST",
            "/api/jira/create-ticket",
            json!({ "project": "OPS", "summary": "Book venue" }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        let json = body_json(resp).await;
        assert_eq!(
            json["error"],
            "Received an HTML login page from the access layer instead of JSON"
        );
        assert_eq!(json["details"]["upstreamStatus"], 200);
        assert!(json.get("ticket").is_none());
    }

    #[tokio::test]
    async fn test_ticket_upstream_status_is_forwarded() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/api/3/issue")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"errorMessages":["unauthorized"]}"#)
            .create_async()
            .await;

        let resp = send(
            tracker_env(&server.url()),
            "POST",
            "/api/jira/create-ticket",
            json!({ "project": "OPS", "summary": "Book venue" }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "Failed to create ticket");
        assert_eq!(json["details"]["errorMessages"][0], "unauthorized");
    }

    #[tokio::test]
    async fn test_ticket_malformed_body_is_json_error() {
        let resp = send_raw("/api/jira/create-ticket", Some("application/json"), "{not json").await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(resp.headers()["content-type"].to_str().unwrap().starts_with("application/json"));
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("JSON"));
    }

    #[tokio::test]
    async fn test_ticket_without_content_type_is_json_error() {
        let resp = send_raw("/api/jira/create-ticket", None, r#"{"project":"OPS","summary":"x"}"#).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert!(json["error"].as_str().unwrap().contains("Content-Type"));
    }

    #[tokio::test]
    async fn test_template_bad_bodies_get_failure_body() {
        for (content_type, body) in [
            (Some("application/json"), "{not json"),
            (Some("application/json"), r#"{"taskText":5}"#),
            (None, r#"{"taskText":"Demo"}"#),
        ] {
            let resp = send_raw("/api/generate-comm-template", content_type, body).await;
            assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR, "{body}");
            let json = body_json(resp).await;
            assert_eq!(json["success"], false);
            assert_eq!(json["error"], "Failed to generate template");
            assert!(json["details"].as_str().is_some_and(|d| !d.is_empty()));
        }
    }
}
