mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::json;

use common::{internal, principal, service_token, TestApp};
use insure_platform::auth::{Role, ServiceTokenIssuer, SERVICE_KEY_HEADER};
use insure_platform::types::ServiceKind;

fn customer() -> serde_json::Value {
    json!({ "first_name": "Ada", "last_name": "Lovelace", "email": "ada@example.com" })
}

#[tokio::test]
async fn public_routes_need_no_credentials() -> Result<()> {
    let app = TestApp::new(ServiceKind::CustomerService);

    let (status, body) = app.send(Request::get("/health").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");

    let (status, body) = app.send(Request::get("/").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["service"], "customer-service");
    Ok(())
}

#[tokio::test]
async fn missing_service_key_is_rejected() -> Result<()> {
    let app = TestApp::new(ServiceKind::CustomerService);

    let (status, body) = app.send(Request::get("/api/customers").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn wrong_service_key_is_rejected_before_any_work() -> Result<()> {
    let app = TestApp::new(ServiceKind::CustomerService);
    let token = service_token(&principal(1, &[Role::CustomerService]), ServiceKind::CustomerService);

    let request = Request::post("/api/customers")
        .header(SERVICE_KEY_HEADER, "not-the-key")
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(customer().to_string()))?;
    let (status, _) = app.send(request).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.state.storage.customers.count().await?, 0);
    Ok(())
}

#[tokio::test]
async fn reads_need_only_the_key() -> Result<()> {
    let app = TestApp::new(ServiceKind::CustomerService);

    let (status, body) = app.send(internal(Method::GET, "/api/customers", None, None)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn create_without_token_is_unauthenticated() -> Result<()> {
    let app = TestApp::new(ServiceKind::CustomerService);

    let (status, body) = app
        .send(internal(Method::POST, "/api/customers", None, Some(customer())))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHENTICATED");
    Ok(())
}

#[tokio::test]
async fn create_without_matching_role_is_forbidden() -> Result<()> {
    let app = TestApp::new(ServiceKind::CustomerService);
    let token = service_token(&principal(1, &[Role::Quoting]), ServiceKind::CustomerService);

    let (status, body) = app
        .send(internal(Method::POST, "/api/customers", Some(&token), Some(customer())))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "FORBIDDEN");
    assert_eq!(app.state.storage.customers.count().await?, 0);
    Ok(())
}

#[tokio::test]
async fn admin_may_create_where_listed() -> Result<()> {
    let app = TestApp::new(ServiceKind::CustomerService);
    let token = service_token(&principal(9, &[Role::Admin]), ServiceKind::CustomerService);

    let (status, body) = app
        .send(internal(Method::POST, "/api/customers", Some(&token), Some(customer())))
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["email"], "ada@example.com");
    Ok(())
}

#[tokio::test]
async fn token_for_another_service_is_rejected() -> Result<()> {
    let app = TestApp::new(ServiceKind::CustomerService);
    let token = service_token(&principal(1, &[Role::CustomerService]), ServiceKind::Quoting);

    let (status, body) = app
        .send(internal(Method::POST, "/api/customers", Some(&token), Some(customer())))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
    Ok(())
}

#[tokio::test]
async fn expired_token_is_rejected() -> Result<()> {
    let app = TestApp::new(ServiceKind::CustomerService);
    let long_ago = chrono::Utc::now().timestamp() - 3600;
    let token = ServiceTokenIssuer::new(common::JWT_SECRET)?
        .issue_at(
            &principal(1, &[Role::CustomerService]),
            ServiceKind::CustomerService.as_str(),
            long_ago,
        )?
        .token;

    let (status, body) = app
        .send(internal(Method::GET, "/api/customers", Some(&token), None))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "TOKEN_EXPIRED");
    Ok(())
}

#[tokio::test]
async fn session_token_is_not_a_service_token() -> Result<()> {
    let app = TestApp::new(ServiceKind::CustomerService);
    let session = common::session_token(&principal(1, &[Role::CustomerService]));

    let (status, _) = app
        .send(internal(Method::POST, "/api/customers", Some(&session), Some(customer())))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn each_service_only_mounts_its_own_routes() -> Result<()> {
    let app = TestApp::new(ServiceKind::BenefitDesigner);

    let (status, _) = app.send(internal(Method::GET, "/api/customers", None, None)).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send(internal(Method::GET, "/api/templates", None, None)).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn bearer_scheme_is_case_insensitive() -> Result<()> {
    let app = TestApp::new(ServiceKind::CustomerService);
    let token = service_token(&principal(1, &[Role::CustomerService]), ServiceKind::CustomerService);

    let request = Request::post("/api/customers")
        .header(SERVICE_KEY_HEADER, common::SERVICE_KEY)
        .header("authorization", format!("bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(customer().to_string()))?;
    let (status, _) = app.send(request).await?;
    assert_eq!(status, StatusCode::CREATED);
    Ok(())
}
