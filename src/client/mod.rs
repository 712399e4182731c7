//! HTTP client for calls between platform services.
//!
//! Every request carries the shared `X-Service-Key` and, when the caller
//! acts for a user, a bearer service token minted for the target service.
//! Responses are unwrapped from the `{success, data}` envelope.

pub mod benefit_designer;
pub mod quoting;

use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::auth::{TokenError, SERVICE_KEY_HEADER};
use crate::config::UpstreamConfig;
use crate::types::ServiceKind;

pub use benefit_designer::BenefitDesignerClient;
pub use quoting::QuotingClient;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{url} responded with {status} {status_text}")]
    Upstream {
        url: String,
        status: u16,
        status_text: String,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("unexpected response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("failed to build HTTP client: {0}")]
    Build(String),
}

impl ClientError {
    fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout { url: url.to_string() }
        } else if err.is_decode() {
            ClientError::Decode {
                url: url.to_string(),
                message: err.to_string(),
            }
        } else {
            ClientError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
}

/// Undecoded downstream response, relayed as-is by proxy routes
#[derive(Debug)]
pub struct RawResponse {
    pub url: String,
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Client bound to one sibling service
#[derive(Clone)]
pub struct ServiceClient {
    http: Client,
    target: ServiceKind,
    base_url: String,
    service_key: String,
    retry_transient: bool,
}

impl std::fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceClient")
            .field("target", &self.target)
            .field("base_url", &self.base_url)
            .field("service_key", &"<REDACTED>")
            .finish()
    }
}

impl ServiceClient {
    pub fn new(target: ServiceKind, upstream: &UpstreamConfig, service_key: &str) -> Result<Self, ClientError> {
        Self::with_base_url(
            target,
            upstream.base_url(target),
            service_key,
            Duration::from_secs(upstream.timeout_secs),
            upstream.retry_transient,
        )
    }

    pub fn with_base_url(
        target: ServiceKind,
        base_url: &str,
        service_key: &str,
        timeout: Duration,
        retry_transient: bool,
    ) -> Result<Self, ClientError> {
        Url::parse(base_url).map_err(|e| ClientError::Build(format!("invalid base URL '{}': {}", base_url, e)))?;

        // Redirects are never followed: the service key must not reach another host
        let http = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(2)))
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            http,
            target,
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key: service_key.to_string(),
            retry_transient,
        })
    }

    pub fn target(&self) -> ServiceKind {
        self.target
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path such as `/api/quotes?x=1`
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> Result<T, ClientError> {
        let url = self.url(path);
        let response = self.execute(Method::GET, &url, None, token, false).await?;
        Self::read_envelope(&url, response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B, token: Option<&str>) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let body = serde_json::to_value(body).map_err(|e| ClientError::Decode {
            url: url.clone(),
            message: format!("request body could not be encoded: {}", e),
        })?;
        let response = self.execute(Method::POST, &url, Some(&body), token, false).await?;
        Self::read_envelope(&url, response).await
    }

    /// GET without caching and without interpreting the status or body
    pub async fn get_raw(&self, path: &str, token: Option<&str>) -> Result<RawResponse, ClientError> {
        let url = self.url(path);
        let response = self.execute(Method::GET, &url, None, token, true).await?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::from_reqwest(&url, e))?
            .to_vec();

        Ok(RawResponse {
            url,
            status,
            content_type,
            body,
        })
    }

    fn request(&self, method: Method, url: &str, body: Option<&Value>, token: Option<&str>, no_store: bool) -> RequestBuilder {
        let mut request = self
            .http
            .request(method, url)
            .header(SERVICE_KEY_HEADER, &self.service_key)
            .header(CONTENT_TYPE, "application/json");

        if no_store {
            request = request.header(CACHE_CONTROL, "no-store");
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        request
    }

    /// Send with at most one retry. GETs retry on connect errors, timeouts
    /// and 502/503/504; POSTs only when the connection was never made.
    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        token: Option<&str>,
        no_store: bool,
    ) -> Result<Response, ClientError> {
        let idempotent = method == Method::GET;
        let attempts = if self.retry_transient { 2 } else { 1 };
        let mut attempt = 1;

        loop {
            debug!(target_service = %self.target, %method, %url, attempt, "Calling sibling service");
            let result = self.request(method.clone(), url, body, token, no_store).send().await;
            let retry_left = attempt < attempts;

            match result {
                Ok(response) if idempotent && retry_left && is_transient_status(response.status()) => {
                    warn!(%url, status = %response.status(), "Transient upstream status, retrying once");
                }
                Ok(response) => return Ok(response),
                Err(err) if retry_left && (err.is_connect() || (idempotent && err.is_timeout())) => {
                    warn!(%url, error = %err, "Transient upstream failure, retrying once");
                }
                Err(err) => return Err(ClientError::from_reqwest(url, err)),
            }

            attempt += 1;
        }
    }

    async fn read_envelope<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Upstream {
                url: url.to_string(),
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let envelope: Envelope<T> = response.json().await.map_err(|e| ClientError::from_reqwest(url, e))?;
        match envelope {
            Envelope {
                success: true,
                data: Some(data),
            } => Ok(data),
            _ => Err(ClientError::Decode {
                url: url.to_string(),
                message: "response envelope carried no data".to_string(),
            }),
        }
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}
