mod common;

use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::extract::Request;
use axum::http::{header, Method, StatusCode};
use axum::response::IntoResponse;
use axum::Router;
use serde_json::json;

use common::{dead_url, principal, record, serve, session_token, test_config, with_session, Seen, TestApp};
use insure_platform::auth::{Role, TokenVerifier, SERVICE_KEY_HEADER};
use insure_platform::types::ServiceKind;

/// Benefit designer stand-in that answers per path and records every request
async fn fake_benefit_designer(seen: Seen) -> Result<String> {
    let router = Router::new().fallback(move |request: Request| {
        let seen = seen.clone();
        async move {
            record(&seen, &request);
            match request.uri().path() {
                "/api/templates/7" => (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "application/json")],
                    json!({ "success": true, "data": { "id": 7, "name": "Bronze" } }).to_string(),
                )
                    .into_response(),
                "/api/templates" => (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, "application/json")],
                    json!({ "success": true, "data": [] }).to_string(),
                )
                    .into_response(),
                _ => (
                    StatusCode::NOT_FOUND,
                    [(header::CONTENT_TYPE, "text/plain")],
                    "x".repeat(500),
                )
                    .into_response(),
            }
        }
    });
    serve(router).await
}

async fn proxy_app() -> Result<(TestApp, Seen)> {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let mut config = test_config(ServiceKind::Quoting);
    config.upstream.benefit_designer_url = fake_benefit_designer(seen.clone()).await?;
    Ok((TestApp::with_config(config), seen))
}

fn session() -> String {
    session_token(&principal(11, &[Role::Quoting]))
}

#[tokio::test]
async fn template_by_id_is_relayed_verbatim() -> Result<()> {
    let (app, seen) = proxy_app().await?;

    let response = app
        .send_raw(with_session(Method::GET, "/api/templates-proxy?id=7&type=group", &session(), None))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body: serde_json::Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["data"]["id"], 7);

    let seen = seen.lock().expect("seen lock").clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].uri, "/api/templates/7");
    assert_eq!(seen[0].headers[SERVICE_KEY_HEADER], common::SERVICE_KEY);
    assert_eq!(seen[0].headers[header::CACHE_CONTROL], "no-store");

    let bearer = seen[0].headers[header::AUTHORIZATION].to_str()?;
    let token = bearer.strip_prefix("Bearer ").unwrap_or_default();
    let claims = TokenVerifier::new(common::JWT_SECRET, 0)?.verify_service_token(token, "benefit-designer-service")?;
    assert_eq!(claims.user_id, 11);
    Ok(())
}

#[tokio::test]
async fn unknown_type_selects_active_individual_templates() -> Result<()> {
    let (app, seen) = proxy_app().await?;

    let (status, body) = app
        .send(with_session(Method::GET, "/api/templates-proxy?type=bogus", &session(), None))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, _) = app
        .send(with_session(Method::GET, "/api/templates-proxy?type=group", &session(), None))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let seen = seen.lock().expect("seen lock").clone();
    assert_eq!(seen[0].uri, "/api/templates?type=individual&status=active&latest=true");
    assert_eq!(seen[1].uri, "/api/templates?type=group&status=active&latest=true");
    Ok(())
}

#[tokio::test]
async fn downstream_error_keeps_its_status_with_truncated_details() -> Result<()> {
    let (app, _seen) = proxy_app().await?;

    let (status, body) = app
        .send(with_session(Method::GET, "/api/templates-proxy?id=8", &session(), None))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "UPSTREAM_ERROR");
    assert_eq!(body["details"].as_str().map(str::len), Some(200));
    Ok(())
}

#[tokio::test]
async fn unreachable_downstream_is_a_proxy_error() -> Result<()> {
    let mut config = test_config(ServiceKind::Quoting);
    config.upstream.benefit_designer_url = dead_url();
    config.upstream.retry_transient = false;
    let base = config.upstream.benefit_designer_url.clone();
    let app = TestApp::with_config(config);

    let (status, body) = app
        .send(with_session(Method::GET, "/api/templates-proxy?id=3", &session(), None))
        .await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "PROXY_ERROR");
    assert_eq!(body["baseUrl"], base.as_str());
    assert_eq!(body["url"], format!("{}/api/templates/3", base));
    Ok(())
}

#[tokio::test]
async fn diagnostics_are_hidden_when_disabled() -> Result<()> {
    let mut config = test_config(ServiceKind::Quoting);
    config.upstream.benefit_designer_url = dead_url();
    config.upstream.retry_transient = false;
    config.security.expose_upstream_diagnostics = false;
    let app = TestApp::with_config(config);

    let (status, body) = app
        .send(with_session(Method::GET, "/api/templates-proxy", &session(), None))
        .await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "PROXY_ERROR");
    assert!(body.get("url").is_none());
    assert!(body.get("baseUrl").is_none());
    Ok(())
}

#[tokio::test]
async fn rejects_bad_id_and_missing_session() -> Result<()> {
    let (app, seen) = proxy_app().await?;

    let (status, _) = app
        .send(with_session(Method::GET, "/api/templates-proxy?id=seven", &session(), None))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = axum::http::Request::get("/api/templates-proxy?id=7").body(Body::empty())?;
    let (status, body) = app.send(request).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHENTICATED");

    assert!(seen.lock().expect("seen lock").is_empty());
    Ok(())
}
