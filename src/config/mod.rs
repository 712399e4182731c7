use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use thiserror::Error;
use url::Url;

use crate::types::{ServiceKind, UnknownService};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {0}")]
    Missing(&'static str),

    #[error("invalid URL for {name}: {value}")]
    InvalidUrl { name: &'static str, value: String },

    #[error(transparent)]
    UnknownService(#[from] UnknownService),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub service: ServiceKind,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub apply_schema: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub internal_service_key: String,
    #[serde(skip_serializing)]
    pub jwt_secret: String,
    pub token_leeway_secs: u64,
    pub expose_upstream_diagnostics: bool,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("internal_service_key", &"<REDACTED>")
            .field("jwt_secret", &"<REDACTED>")
            .field("token_leeway_secs", &self.token_leeway_secs)
            .field("expose_upstream_diagnostics", &self.expose_upstream_diagnostics)
            .field("enable_cors", &self.enable_cors)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

/// Base URLs of sibling services plus the outbound call policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    pub users_url: String,
    pub customer_service_url: String,
    pub quoting_service_url: String,
    pub benefit_designer_url: String,
    pub timeout_secs: u64,
    pub retry_transient: bool,
}

impl UpstreamConfig {
    pub fn base_url(&self, service: ServiceKind) -> &str {
        match service {
            ServiceKind::Users => &self.users_url,
            ServiceKind::CustomerService => &self.customer_service_url,
            ServiceKind::Quoting => &self.quoting_service_url,
            ServiceKind::BenefitDesigner => &self.benefit_designer_url,
        }
    }
}

impl AppConfig {
    /// Build the configuration from the process environment and validate it.
    ///
    /// Any error here is fatal: the binaries refuse to start rather than
    /// fail each request later.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::from_env_unchecked()?;
        config.validate()?;
        Ok(config)
    }

    /// Environment preset plus overrides, without [`AppConfig::validate`].
    /// The CLI uses this since it never opens a database.
    pub fn from_env_unchecked() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let service = match env::var("SERVICE_NAME") {
            Ok(name) => name.parse()?,
            Err(_) => ServiceKind::Users,
        };

        Ok(Self::preset(environment, service).with_env_overrides())
    }

    /// Environment defaults with empty secrets. Callers fill in secrets and
    /// call [`AppConfig::validate`].
    pub fn preset(environment: Environment, service: ServiceKind) -> Self {
        match environment {
            Environment::Production => Self::production(service),
            Environment::Staging => Self::staging(service),
            Environment::Development => Self::development(service),
        }
    }

    fn with_env_overrides(mut self) -> Self {
        // Server
        if let Some(port) = env::var("SERVICE_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.server.port = port;
        }
        if let Ok(v) = env::var("SERVICE_HOST") {
            self.server.host = v;
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_APPLY_SCHEMA") {
            self.database.apply_schema = v.parse().unwrap_or(self.database.apply_schema);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("INTERNAL_SERVICE_KEY") {
            self.security.internal_service_key = v;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_TOKEN_LEEWAY_SECS") {
            self.security.token_leeway_secs = v.parse().unwrap_or(self.security.token_leeway_secs);
        }
        if let Ok(v) = env::var("SECURITY_EXPOSE_UPSTREAM_DIAGNOSTICS") {
            self.security.expose_upstream_diagnostics =
                v.parse().unwrap_or(self.security.expose_upstream_diagnostics);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        // Upstream overrides
        if let Ok(v) = env::var("USERS_SERVICE_URL") {
            self.upstream.users_url = v;
        }
        if let Ok(v) = env::var("CUSTOMER_SERVICE_URL") {
            self.upstream.customer_service_url = v;
        }
        if let Ok(v) = env::var("QUOTING_SERVICE_URL") {
            self.upstream.quoting_service_url = v;
        }
        if let Ok(v) = env::var("BENEFIT_DESIGNER_SERVICE_URL") {
            self.upstream.benefit_designer_url = v;
        }
        if let Ok(v) = env::var("UPSTREAM_TIMEOUT_SECS") {
            self.upstream.timeout_secs = v.parse().unwrap_or(self.upstream.timeout_secs);
        }
        if let Ok(v) = env::var("UPSTREAM_RETRY_TRANSIENT") {
            self.upstream.retry_transient = v.parse().unwrap_or(self.upstream.retry_transient);
        }

        self
    }

    /// Reject configurations every request would fail under
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.security.internal_service_key.trim().is_empty() {
            return Err(ConfigError::Missing("INTERNAL_SERVICE_KEY"));
        }
        if self.security.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }
        if self.database.url.as_deref().map_or(true, |u| u.trim().is_empty()) {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        for (name, value) in [
            ("USERS_SERVICE_URL", &self.upstream.users_url),
            ("CUSTOMER_SERVICE_URL", &self.upstream.customer_service_url),
            ("QUOTING_SERVICE_URL", &self.upstream.quoting_service_url),
            ("BENEFIT_DESIGNER_SERVICE_URL", &self.upstream.benefit_designer_url),
        ] {
            if Url::parse(value).is_err() {
                return Err(ConfigError::InvalidUrl { name, value: value.clone() });
            }
        }

        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    fn local_upstreams() -> UpstreamConfig {
        UpstreamConfig {
            users_url: format!("http://localhost:{}", ServiceKind::Users.default_port()),
            customer_service_url: format!("http://localhost:{}", ServiceKind::CustomerService.default_port()),
            quoting_service_url: format!("http://localhost:{}", ServiceKind::Quoting.default_port()),
            benefit_designer_url: format!("http://localhost:{}", ServiceKind::BenefitDesigner.default_port()),
            timeout_secs: 10,
            retry_transient: true,
        }
    }

    fn development(service: ServiceKind) -> Self {
        Self {
            environment: Environment::Development,
            service,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: service.default_port(),
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                apply_schema: true,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                internal_service_key: String::new(),
                jwt_secret: String::new(),
                token_leeway_secs: 0,
                expose_upstream_diagnostics: true,
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            upstream: Self::local_upstreams(),
        }
    }

    fn staging(service: ServiceKind) -> Self {
        Self {
            environment: Environment::Staging,
            service,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: service.default_port(),
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                apply_schema: true,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                internal_service_key: String::new(),
                jwt_secret: String::new(),
                token_leeway_secs: 0,
                expose_upstream_diagnostics: false,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            upstream: UpstreamConfig {
                timeout_secs: 8,
                ..Self::local_upstreams()
            },
        }
    }

    fn production(service: ServiceKind) -> Self {
        Self {
            environment: Environment::Production,
            service,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: service.default_port(),
            },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                apply_schema: false,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                internal_service_key: String::new(),
                jwt_secret: String::new(),
                token_leeway_secs: 0,
                expose_upstream_diagnostics: false,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            upstream: UpstreamConfig {
                timeout_secs: 5,
                ..Self::local_upstreams()
            },
        }
    }
}
