use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::marker::PhantomData;
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::table::{Entity, Filter, Table};

/// In-process [`Table`] holding rows as JSON objects.
///
/// Mirrors the Postgres behaviour the handlers rely on: generated `id` and
/// `created_at`, text-equality filters, latest-per-partition selection and
/// id ordering. Backs the integration tests.
pub struct MemoryTable<E> {
    rows: RwLock<Vec<Map<String, Value>>>,
    unique: &'static [&'static [&'static str]],
    _phantom: PhantomData<fn() -> E>,
}

impl<E: Entity> MemoryTable<E> {
    pub fn new() -> Self {
        Self::with_unique(&[])
    }

    /// Enforce each key on insert. A key lists one or more columns whose
    /// combined values must be unique, like `UNIQUE (a, b)`.
    pub fn with_unique(keys: &'static [&'static [&'static str]]) -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            unique: keys,
            _phantom: PhantomData,
        }
    }

    fn text(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    fn matches(row: &Map<String, Value>, filter: &Filter) -> bool {
        filter.equals.iter().all(|(column, expected)| {
            row.get(*column)
                .map(|v| !v.is_null() && Self::text(v) == *expected)
                .unwrap_or(false)
        })
    }

    fn order_key(row: &Map<String, Value>, column: &str) -> f64 {
        match row.get(column) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::MIN),
            Some(Value::String(s)) => s.parse().unwrap_or(f64::MIN),
            _ => f64::MIN,
        }
    }

    fn id_of(row: &Map<String, Value>) -> i64 {
        row.get("id").and_then(Value::as_i64).unwrap_or_default()
    }
}

impl<E: Entity> Default for MemoryTable<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> Table<E> for MemoryTable<E> {
    async fn list(&self, filter: &Filter) -> Result<Vec<E>, DatabaseError> {
        let rows = self.rows.read().await;
        let mut selected: Vec<&Map<String, Value>> = rows.iter().filter(|r| Self::matches(r, filter)).collect();

        if let Some(latest) = filter.latest {
            let mut best: HashMap<String, &Map<String, Value>> = HashMap::new();
            for row in selected {
                let partition = row.get(latest.partition_by).map(Self::text).unwrap_or_default();
                let replace = match best.get(&partition) {
                    Some(current) => {
                        let (a, b) = (Self::order_key(row, latest.order_by), Self::order_key(current, latest.order_by));
                        a > b || (a == b && Self::id_of(row) > Self::id_of(current))
                    }
                    None => true,
                };
                if replace {
                    best.insert(partition, row);
                }
            }
            selected = best.into_values().collect();
        }

        selected.sort_by_key(|r| Self::id_of(r));
        selected
            .into_iter()
            .map(|r| serde_json::from_value(Value::Object(r.clone())).map_err(DatabaseError::from))
            .collect()
    }

    async fn find(&self, id: i32) -> Result<Option<E>, DatabaseError> {
        let rows = self.rows.read().await;
        rows.iter()
            .find(|r| Self::id_of(r) == id as i64)
            .map(|r| serde_json::from_value(Value::Object(r.clone())).map_err(DatabaseError::from))
            .transpose()
    }

    async fn insert(&self, new: E::New) -> Result<E, DatabaseError> {
        let mut row = match serde_json::to_value(&new)? {
            Value::Object(map) => map,
            other => return Err(DatabaseError::Decode(format!("insert payload is not an object: {}", other))),
        };

        let mut rows = self.rows.write().await;

        for key in self.unique {
            // NULL never collides, as in Postgres
            let values: Option<Vec<&Value>> = key.iter().map(|c| row.get(*c).filter(|v| !v.is_null())).collect();
            let Some(values) = values else { continue };

            let taken = rows
                .iter()
                .any(|r| key.iter().zip(&values).all(|(c, v)| r.get(*c) == Some(*v)));
            if taken {
                return Err(DatabaseError::UniqueViolation(format!(
                    "duplicate key value violates unique constraint on {} ({})",
                    E::TABLE,
                    key.join(", ")
                )));
            }
        }

        let next_id = rows.iter().map(Self::id_of).max().unwrap_or(0) + 1;
        row.insert("id".to_string(), json!(next_id));
        row.entry("created_at".to_string()).or_insert_with(|| json!(Utc::now()));

        let entity: E = serde_json::from_value(Value::Object(row.clone()))?;
        rows.push(row);
        Ok(entity)
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        Ok(self.rows.read().await.len() as i64)
    }
}
