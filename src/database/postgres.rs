use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use std::marker::PhantomData;

use super::manager::{DatabaseError, DatabaseManager};
use super::table::{Entity, Filter, Table};

/// Postgres-backed [`Table`]. Rows travel as `row_to_json` so one
/// implementation serves every entity.
pub struct PgTable<E> {
    pool: PgPool,
    _phantom: PhantomData<fn() -> E>,
}

impl<E: Entity> PgTable<E> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: PhantomData,
        }
    }

    fn table() -> String {
        DatabaseManager::quote_identifier(E::TABLE)
    }

    fn decode(row: &PgRow) -> Result<E, DatabaseError> {
        let value: Value = row.try_get("row")?;
        Ok(serde_json::from_value(value)?)
    }

    /// SELECT for `filter`; placeholders are numbered in `filter.equals` order
    fn select_sql(filter: &Filter) -> String {
        let table = Self::table();

        let conditions: Vec<String> = filter
            .equals
            .iter()
            .enumerate()
            .map(|(i, (column, _))| format!("{}::text = ${}", DatabaseManager::quote_identifier(column), i + 1))
            .collect();
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let inner = match filter.latest {
            Some(latest) => {
                let partition = DatabaseManager::quote_identifier(latest.partition_by);
                let order = DatabaseManager::quote_identifier(latest.order_by);
                format!(
                    "SELECT DISTINCT ON ({partition}) * FROM {table}{where_clause} ORDER BY {partition}, {order} DESC, \"id\" DESC"
                )
            }
            None => format!("SELECT * FROM {table}{where_clause}"),
        };

        format!("SELECT row_to_json(t) AS row FROM ({inner}) t ORDER BY t.\"id\"")
    }

    fn insert_sql() -> String {
        let table = Self::table();
        let columns = E::INSERT_COLUMNS
            .iter()
            .map(|c| DatabaseManager::quote_identifier(c))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "WITH inserted AS (\
                INSERT INTO {table} ({columns}) \
                SELECT {columns} FROM jsonb_populate_record(NULL::{table}, $1) \
                RETURNING *\
            ) SELECT row_to_json(inserted) AS row FROM inserted"
        )
    }
}

#[async_trait]
impl<E: Entity> Table<E> for PgTable<E> {
    async fn list(&self, filter: &Filter) -> Result<Vec<E>, DatabaseError> {
        let sql = Self::select_sql(filter);
        let mut query = sqlx::query(&sql);
        for (_, value) in &filter.equals {
            query = query.bind(value);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(Self::decode).collect()
    }

    async fn find(&self, id: i32) -> Result<Option<E>, DatabaseError> {
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM {} WHERE \"id\" = $1) t",
            Self::table()
        );

        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(Self::decode).transpose()
    }

    async fn insert(&self, new: E::New) -> Result<E, DatabaseError> {
        let sql = Self::insert_sql();
        let row = sqlx::query(&sql).bind(Json(&new)).fetch_one(&self.pool).await?;
        Self::decode(&row)
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        let sql = format!("SELECT COUNT(*) FROM {}", Self::table());
        let (count,): (i64,) = sqlx::query_as(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::template::Template;

    #[test]
    fn select_without_filter() {
        assert_eq!(
            PgTable::<Template>::select_sql(&Filter::all()),
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"templates\") t ORDER BY t.\"id\""
        );
    }

    #[test]
    fn select_latest_with_filters() {
        let filter = Filter::all()
            .eq("plan_type", "group")
            .eq("status", "active")
            .latest("name", "version");
        let sql = PgTable::<Template>::select_sql(&filter);
        assert!(sql.contains("SELECT DISTINCT ON (\"name\") * FROM \"templates\""));
        assert!(sql.contains("WHERE \"plan_type\"::text = $1 AND \"status\"::text = $2"));
        assert!(sql.contains("ORDER BY \"name\", \"version\" DESC"));
    }

    #[test]
    fn insert_writes_only_declared_columns() {
        let sql = PgTable::<Template>::insert_sql();
        assert!(sql.starts_with("WITH inserted AS (INSERT INTO \"templates\" (\"name\", \"plan_type\""));
        assert!(!sql.contains("\"id\","));
        assert!(sql.contains("jsonb_populate_record(NULL::\"templates\", $1)"));
    }
}
