#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use insure_platform::app::app;
use insure_platform::auth::{Principal, Role, ServiceTokenIssuer, SessionSigner, SERVICE_KEY_HEADER};
use insure_platform::config::{AppConfig, Environment};
use insure_platform::database::Storage;
use insure_platform::state::AppState;
use insure_platform::types::ServiceKind;

pub const SERVICE_KEY: &str = "test-internal-service-key";
pub const JWT_SECRET: &str = "test-jwt-secret";

pub fn test_config(service: ServiceKind) -> AppConfig {
    let mut config = AppConfig::preset(Environment::Development, service);
    config.security.internal_service_key = SERVICE_KEY.to_string();
    config.security.jwt_secret = JWT_SECRET.to_string();
    config.database.url = Some("postgres://localhost/unused".to_string());
    config.api.enable_request_logging = false;
    config.upstream.timeout_secs = 2;
    config
}

/// One service wired to in-memory storage
pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub fn new(service: ServiceKind) -> Self {
        Self::with_config(test_config(service))
    }

    pub fn with_config(config: AppConfig) -> Self {
        let state = AppState::new(config, Storage::memory()).expect("test state");
        let router = app(state.clone());
        Self { state, router }
    }

    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };
        Ok((status, body))
    }

    /// Send and return the raw response, for header and byte-level checks
    pub async fn send_raw(&self, request: Request<Body>) -> Result<axum::response::Response> {
        Ok(self.router.clone().oneshot(request).await?)
    }
}

pub fn principal(user_id: i32, roles: &[Role]) -> Principal {
    Principal::new(user_id, format!("user{}@example.com", user_id), roles.iter().copied())
}

pub fn session_token(principal: &Principal) -> String {
    SessionSigner::new(JWT_SECRET)
        .and_then(|signer| signer.sign(principal, 3600))
        .expect("session token")
}

pub fn service_token(principal: &Principal, service: ServiceKind) -> String {
    ServiceTokenIssuer::new(JWT_SECRET)
        .and_then(|issuer| issuer.issue(principal, service.as_str()))
        .expect("service token")
        .token
}

/// Request with the shared key and, optionally, a bearer token and JSON body
pub fn internal(method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(SERVICE_KEY_HEADER, SERVICE_KEY);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

/// Browser-style request carrying a session token
pub fn with_session(method: Method, path: &str, session: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {}", session));
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

/// What a fake sibling service saw
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
}

pub type Seen = Arc<Mutex<Vec<SeenRequest>>>;

pub fn record(seen: &Seen, request: &Request<Body>) {
    seen.lock().expect("seen lock").push(SeenRequest {
        method: request.method().clone(),
        uri: request.uri().to_string(),
        headers: request.headers().clone(),
    });
}

/// Serve `router` on a free local port and return its base URL
pub async fn serve(router: Router) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(format!("http://127.0.0.1:{}", port))
}

/// A base URL nothing listens on
pub fn dead_url() -> String {
    let port = portpicker::pick_unused_port().expect("free port");
    format!("http://127.0.0.1:{}", port)
}
