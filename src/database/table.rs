use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use super::manager::DatabaseError;

/// A row type backed by one relational table
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    /// Validated insert payload; its serialized keys are column names
    type New: Serialize + Send + Sync + 'static;

    const TABLE: &'static str;

    /// Columns written on insert, matching the fields of `New`
    const INSERT_COLUMNS: &'static [&'static str];
}

/// Keep only the highest `order_by` row per distinct `partition_by` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latest {
    pub partition_by: &'static str,
    pub order_by: &'static str,
}

/// Equality filter over text representations of column values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub equals: Vec<(&'static str, String)>,
    pub latest: Option<Latest>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &'static str, value: impl Into<String>) -> Self {
        self.equals.push((column, value.into()));
        self
    }

    pub fn latest(mut self, partition_by: &'static str, order_by: &'static str) -> Self {
        self.latest = Some(Latest { partition_by, order_by });
        self
    }
}

#[async_trait]
pub trait Table<E: Entity>: Send + Sync {
    /// Rows matching `filter`, ordered by id
    async fn list(&self, filter: &Filter) -> Result<Vec<E>, DatabaseError>;

    async fn find(&self, id: i32) -> Result<Option<E>, DatabaseError>;

    /// Insert and return the stored row, including generated columns
    async fn insert(&self, new: E::New) -> Result<E, DatabaseError>;

    async fn count(&self) -> Result<i64, DatabaseError>;
}
