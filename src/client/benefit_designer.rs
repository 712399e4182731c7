use super::{ClientError, RawResponse, ServiceClient};
use crate::config::UpstreamConfig;
use crate::database::models::Template;
use crate::types::{PlanType, ServiceKind};

/// Typed calls into the benefit designer service
#[derive(Debug, Clone)]
pub struct BenefitDesignerClient {
    inner: ServiceClient,
}

impl BenefitDesignerClient {
    pub fn new(upstream: &UpstreamConfig, service_key: &str) -> Result<Self, ClientError> {
        Ok(Self::from_client(ServiceClient::new(
            ServiceKind::BenefitDesigner,
            upstream,
            service_key,
        )?))
    }

    pub fn from_client(inner: ServiceClient) -> Self {
        Self { inner }
    }

    pub fn service(&self) -> &ServiceClient {
        &self.inner
    }

    pub fn template_path(id: i32) -> String {
        format!("/api/templates/{}", id)
    }

    /// Latest version of every active template of one plan type
    pub fn active_templates_path(plan_type: PlanType) -> String {
        format!("/api/templates?type={}&status=active&latest=true", plan_type.as_str())
    }

    pub async fn get_template(&self, id: i32, token: Option<&str>) -> Result<Template, ClientError> {
        self.inner.get(&Self::template_path(id), token).await
    }

    pub async fn list_active_templates(
        &self,
        plan_type: PlanType,
        token: Option<&str>,
    ) -> Result<Vec<Template>, ClientError> {
        self.inner.get(&Self::active_templates_path(plan_type), token).await
    }

    /// Uncached GET of any templates path, returned undecoded
    pub async fn fetch_raw(&self, path: &str, token: Option<&str>) -> Result<RawResponse, ClientError> {
        self.inner.get_raw(path, token).await
    }
}
