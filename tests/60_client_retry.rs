mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde_json::{json, Value};

use common::{dead_url, record, serve, Seen};
use insure_platform::client::{ClientError, ServiceClient};
use insure_platform::types::ServiceKind;

/// Answers 503 for the first `failures` requests, then a wrapped `{"ok": true}`
async fn flaky(failures: usize, seen: Seen) -> Result<(String, Arc<AtomicUsize>)> {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().fallback(move |request: Request| {
        let seen = seen.clone();
        let counter = counter.clone();
        async move {
            record(&seen, &request);
            if counter.fetch_add(1, Ordering::SeqCst) < failures {
                StatusCode::SERVICE_UNAVAILABLE.into_response()
            } else {
                Json(json!({ "success": true, "data": { "ok": true } })).into_response()
            }
        }
    });
    Ok((serve(router).await?, hits))
}

fn client(base: &str, retry: bool) -> Result<ServiceClient> {
    Ok(ServiceClient::with_base_url(
        ServiceKind::Quoting,
        base,
        common::SERVICE_KEY,
        Duration::from_secs(2),
        retry,
    )?)
}

fn seen() -> Seen {
    Arc::new(Mutex::new(Vec::new()))
}

#[tokio::test]
async fn get_retries_once_after_unavailable() -> Result<()> {
    let (base, hits) = flaky(1, seen()).await?;

    let value: Value = client(&base, true)?.get("/api/quotes", None).await?;
    assert_eq!(value, json!({ "ok": true }));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn get_gives_up_after_second_failure() -> Result<()> {
    let (base, hits) = flaky(5, seen()).await?;

    let err = client(&base, true)?.get::<Value>("/api/quotes", None).await.unwrap_err();
    assert!(matches!(err, ClientError::Upstream { status: 503, .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn post_is_not_retried_on_a_response() -> Result<()> {
    let (base, hits) = flaky(1, seen()).await?;

    let err = client(&base, true)?
        .post::<_, Value>("/api/quotes", &json!({ "template_id": 1 }), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Upstream { status: 503, .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn retry_can_be_disabled() -> Result<()> {
    let (base, hits) = flaky(1, seen()).await?;

    let err = client(&base, false)?.get::<Value>("/api/quotes", None).await.unwrap_err();
    assert!(matches!(err, ClientError::Upstream { status: 503, .. }));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() -> Result<()> {
    let err = client(&dead_url(), true)?.get::<Value>("/api/quotes", None).await.unwrap_err();
    assert!(matches!(err, ClientError::Transport { .. }), "{:?}", err);
    Ok(())
}

#[tokio::test]
async fn requests_carry_key_and_bearer() -> Result<()> {
    let requests = seen();
    let (base, _hits) = flaky(0, requests.clone()).await?;

    let _: Value = client(&base, true)?.get("/api/groups", Some("abc.def.ghi")).await?;
    let raw = client(&base, true)?.get_raw("/api/templates/1", None).await?;
    assert_eq!(raw.status, reqwest::StatusCode::OK);

    let requests = requests.lock().expect("seen lock").clone();
    assert_eq!(requests[0].uri, "/api/groups");
    assert_eq!(requests[0].headers["x-service-key"], common::SERVICE_KEY);
    assert_eq!(requests[0].headers["authorization"], "Bearer abc.def.ghi");
    assert!(!requests[0].headers.contains_key("cache-control"));
    assert_eq!(requests[1].headers["cache-control"], "no-store");
    assert!(!requests[1].headers.contains_key("authorization"));
    Ok(())
}

#[tokio::test]
async fn post_to_a_closed_port_is_a_transport_error() -> Result<()> {
    let err = client(&dead_url(), true)?
        .post::<_, Value>("/api/quotes", &json!({ "template_id": 1 }), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Transport { .. }), "{:?}", err);
    Ok(())
}

/// Origin that redirects everything to `target`
async fn redirecting(target: String, seen: Seen) -> Result<String> {
    let router = Router::new().fallback(move |request: Request| {
        let seen = seen.clone();
        let target = target.clone();
        async move {
            record(&seen, &request);
            axum::response::Redirect::to(&format!("{}/elsewhere", target)).into_response()
        }
    });
    serve(router).await
}

#[tokio::test]
async fn redirects_are_not_followed() -> Result<()> {
    let other_host = seen();
    let (other, other_hits) = flaky(0, other_host.clone()).await?;
    let origin = redirecting(other, seen()).await?;

    let err = client(&origin, true)?.get::<Value>("/api/quotes", None).await.unwrap_err();
    assert!(matches!(err, ClientError::Upstream { status: 303, .. }), "{:?}", err);

    let raw = client(&origin, true)?.get_raw("/api/templates/1", None).await?;
    assert_eq!(raw.status, reqwest::StatusCode::SEE_OTHER);

    assert_eq!(other_hits.load(Ordering::SeqCst), 0);
    assert!(other_host.lock().expect("seen lock").is_empty());
    Ok(())
}
