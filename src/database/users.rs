use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::{PgPool, Row};
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::models::{NewUser, User, UserWithRoles};

/// Users and their role grants. Roles live in a junction table, so this
/// does not fit the single-table [`Table`](super::table::Table) seam.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn list(&self) -> Result<Vec<UserWithRoles>, DatabaseError>;

    async fn find(&self, id: i32) -> Result<Option<UserWithRoles>, DatabaseError>;

    /// Insert the user and every role grant atomically
    async fn create(&self, new: NewUser) -> Result<UserWithRoles, DatabaseError>;

    async fn count(&self) -> Result<i64, DatabaseError>;
}

pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn select_sql(where_clause: &str) -> String {
        format!(
            "SELECT row_to_json(t) AS row FROM (\
                SELECT u.id, u.email, u.name, u.created_at, \
                COALESCE(array_agg(r.role ORDER BY r.role) FILTER (WHERE r.role IS NOT NULL), '{{}}') AS roles \
                FROM users u LEFT JOIN user_roles r ON r.user_id = u.id\
                {where_clause} \
                GROUP BY u.id\
            ) t ORDER BY t.id"
        )
    }

    fn decode(row: &sqlx::postgres::PgRow) -> Result<UserWithRoles, DatabaseError> {
        let value: Value = row.try_get("row")?;
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn list(&self) -> Result<Vec<UserWithRoles>, DatabaseError> {
        let rows = sqlx::query(&Self::select_sql("")).fetch_all(&self.pool).await?;
        rows.iter().map(Self::decode).collect()
    }

    async fn find(&self, id: i32) -> Result<Option<UserWithRoles>, DatabaseError> {
        let row = sqlx::query(&Self::select_sql(" WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(Self::decode).transpose()
    }

    async fn create(&self, new: NewUser) -> Result<UserWithRoles, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let (id,): (i32,) = sqlx::query_as("INSERT INTO users (email, name) VALUES ($1, $2) RETURNING id")
            .bind(&new.email)
            .bind(&new.name)
            .fetch_one(&mut *tx)
            .await?;

        for role in &new.roles {
            sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
                .bind(id)
                .bind(role.as_str())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        self.find(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("user {} vanished after insert", id)))
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users").fetch_one(&self.pool).await?;
        Ok(count)
    }
}

#[derive(Default)]
pub struct MemoryUserDirectory {
    users: RwLock<Vec<UserWithRoles>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn list(&self) -> Result<Vec<UserWithRoles>, DatabaseError> {
        Ok(self.users.read().await.clone())
    }

    async fn find(&self, id: i32) -> Result<Option<UserWithRoles>, DatabaseError> {
        Ok(self.users.read().await.iter().find(|u| u.user.id == id).cloned())
    }

    async fn create(&self, new: NewUser) -> Result<UserWithRoles, DatabaseError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.user.email == new.email) {
            return Err(DatabaseError::UniqueViolation(format!(
                "duplicate key value violates unique constraint on users.email ({})",
                new.email
            )));
        }

        let id = users.iter().map(|u| u.user.id).max().unwrap_or(0) + 1;
        let created = UserWithRoles {
            user: User {
                id,
                email: new.email,
                name: new.name,
                created_at: Utc::now(),
            },
            roles: new.roles,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        Ok(self.users.read().await.len() as i64)
    }
}
