use super::{ClientError, ServiceClient};
use crate::config::UpstreamConfig;
use crate::database::models::{Applicant, Group, NewQuote, Quote};
use crate::types::ServiceKind;

/// Typed calls into the quoting service
#[derive(Debug, Clone)]
pub struct QuotingClient {
    inner: ServiceClient,
}

impl QuotingClient {
    pub fn new(upstream: &UpstreamConfig, service_key: &str) -> Result<Self, ClientError> {
        Ok(Self::from_client(ServiceClient::new(ServiceKind::Quoting, upstream, service_key)?))
    }

    pub fn from_client(inner: ServiceClient) -> Self {
        Self { inner }
    }

    pub fn service(&self) -> &ServiceClient {
        &self.inner
    }

    pub async fn list_quotes(&self, token: Option<&str>) -> Result<Vec<Quote>, ClientError> {
        self.inner.get("/api/quotes", token).await
    }

    pub async fn list_applicants(&self, token: Option<&str>) -> Result<Vec<Applicant>, ClientError> {
        self.inner.get("/api/applicants", token).await
    }

    pub async fn list_groups(&self, token: Option<&str>) -> Result<Vec<Group>, ClientError> {
        self.inner.get("/api/groups", token).await
    }

    pub async fn create_quote(&self, quote: &NewQuote, token: Option<&str>) -> Result<Quote, ClientError> {
        self.inner.post("/api/quotes", quote, token).await
    }
}
