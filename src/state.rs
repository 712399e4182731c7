use std::sync::Arc;
use thiserror::Error;

use crate::auth::{Principal, ServiceKey, ServiceTokenIssuer, TokenError, TokenVerifier};
use crate::client::{BenefitDesignerClient, ClientError, QuotingClient};
use crate::config::AppConfig;
use crate::database::Storage;
use crate::types::ServiceKind;

#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Shared router state. Everything in here is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub storage: Storage,
    pub issuer: ServiceTokenIssuer,
    pub verifier: TokenVerifier,
    pub service_key: ServiceKey,
    pub quoting: QuotingClient,
    pub benefit_designer: BenefitDesignerClient,
}

impl AppState {
    pub fn new(config: AppConfig, storage: Storage) -> Result<Self, StateError> {
        let security = &config.security;
        let issuer = ServiceTokenIssuer::new(&security.jwt_secret)?;
        let verifier = TokenVerifier::new(&security.jwt_secret, security.token_leeway_secs)?;
        let service_key = ServiceKey::new(security.internal_service_key.clone());
        let quoting = QuotingClient::new(&config.upstream, service_key.expose())?;
        let benefit_designer = BenefitDesignerClient::new(&config.upstream, service_key.expose())?;

        Ok(Self {
            config: Arc::new(config),
            storage,
            issuer,
            verifier,
            service_key,
            quoting,
            benefit_designer,
        })
    }

    /// The service this process is serving
    pub fn service(&self) -> ServiceKind {
        self.config.service
    }

    /// Mint a token so `target` sees the call as made by `principal`
    pub fn token_for(&self, principal: &Principal, target: ServiceKind) -> Result<String, TokenError> {
        Ok(self.issuer.issue(principal, target.as_str())?.token)
    }
}
