use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::types::ServiceKind;

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(String),

    #[error("Row decode error: {0}")]
    Decode(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some("23505") => return DatabaseError::UniqueViolation(db_err.message().to_string()),
                Some("23503") => return DatabaseError::ForeignKeyViolation(db_err.message().to_string()),
                _ => {}
            }
        }
        DatabaseError::Sqlx(err)
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(err: serde_json::Error) -> Self {
        DatabaseError::Decode(err.to_string())
    }
}

/// Connection setup for a service's own database
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open the service pool described by `config`
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let parsed = url::Url::parse(url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!(
            "Created database pool for: {}{}",
            parsed.host_str().unwrap_or("localhost"),
            parsed.path()
        );
        Ok(pool)
    }

    /// Apply the service's DDL. Every statement is idempotent.
    pub async fn apply_schema(pool: &PgPool, service: ServiceKind) -> Result<(), DatabaseError> {
        let statements = Self::schema_statements(service);
        for statement in &statements {
            sqlx::query(statement).execute(pool).await?;
        }
        info!("Applied {} schema statements for {}", statements.len(), service);
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    fn schema_sql(service: ServiceKind) -> &'static str {
        match service {
            ServiceKind::Users => include_str!("../../sql/users.sql"),
            ServiceKind::CustomerService => include_str!("../../sql/customer_service.sql"),
            ServiceKind::Quoting => include_str!("../../sql/quoting_service.sql"),
            ServiceKind::BenefitDesigner => include_str!("../../sql/benefit_designer_service.sql"),
        }
    }

    /// Split a schema file into statements, dropping `--` comment lines
    fn schema_statements(service: ServiceKind) -> Vec<String> {
        let without_comments: String = Self::schema_sql(service)
            .lines()
            .filter(|line| !line.trim_start().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");

        without_comments
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Quote SQL identifier to prevent injection
    pub(crate) fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_service_has_schema_statements() {
        for service in ServiceKind::ALL {
            let statements = DatabaseManager::schema_statements(service);
            assert!(!statements.is_empty(), "no DDL for {}", service);
            assert!(statements.iter().all(|s| s.starts_with("CREATE")), "{:?}", statements);
        }
    }

    #[test]
    fn users_schema_has_unique_role_junction() {
        let statements = DatabaseManager::schema_statements(ServiceKind::Users);
        let junction = statements
            .iter()
            .find(|s| s.contains("user_roles"))
            .expect("user_roles table");
        assert!(junction.contains("PRIMARY KEY (user_id, role)"));
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(DatabaseManager::quote_identifier("quotes"), "\"quotes\"");
        assert_eq!(DatabaseManager::quote_identifier("a\"b"), "\"a\"\"b\"");
    }

    #[tokio::test]
    async fn connect_without_url_is_config_error() {
        let config = DatabaseConfig {
            url: None,
            max_connections: 1,
            connection_timeout: 1,
            apply_schema: false,
        };
        assert!(matches!(
            DatabaseManager::connect(&config).await,
            Err(DatabaseError::ConfigMissing("DATABASE_URL"))
        ));
    }
}
