use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use crate::config::DatabaseConfig;

use super::entity::{EntityKey, Item, ScanFilter};
use super::store::{EntityStore, StoreError};
use super::update::UpdateExpression;

/// Postgres-backed single table: `(id, type)` primary key and a JSONB document.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
    table: String,
}

impl PgStore {
    pub fn new(pool: PgPool, table: impl Into<String>) -> Result<Self, StoreError> {
        let table = table.into();
        if !Self::is_valid_table_name(&table) {
            return Err(StoreError::InvalidTableName(table));
        }
        Ok(Self { pool, table })
    }

    /// Open a pool from configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or(StoreError::NotConfigured("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Created database pool for table: {}", config.table_name);
        Self::new(pool, config.table_name.clone())
    }

    /// Create the table and its type index if they are missing.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let table = self.quoted_table();
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id TEXT NOT NULL,
                type TEXT NOT NULL,
                data JSONB NOT NULL,
                PRIMARY KEY (id, type)
            )",
            table
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS \"{}_type_idx\" ON {} (type)",
            self.table, table
        ))
        .execute(&self.pool)
        .await?;

        info!("Ensured schema for table: {}", self.table);
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn quoted_table(&self) -> String {
        format!("\"{}\"", self.table)
    }

    /// Table names are interpolated into SQL, so only `[A-Za-z][A-Za-z0-9_]*` is accepted.
    fn is_valid_table_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() => {}
            _ => return false,
        }
        name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    /// `jsonb_build_object($first, $first+1, ...)` with one name/value pair per assignment.
    fn merge_object_sql(update: &UpdateExpression, first_param: usize) -> String {
        let args: Vec<String> = update
            .assignments()
            .enumerate()
            .map(|(index, _)| {
                let name = first_param + index * 2;
                format!("${}::text, ${}::jsonb", name, name + 1)
            })
            .collect();
        format!("jsonb_build_object({})", args.join(", "))
    }
}

fn into_item(value: Value) -> Result<Item, StoreError> {
    match value {
        Value::Object(item) => Ok(item),
        other => Err(StoreError::Corrupt(format!("expected JSON object, found {}", other))),
    }
}

#[async_trait]
impl EntityStore for PgStore {
    async fn put(&self, item: Item) -> Result<(), StoreError> {
        let key = EntityKey::from_item(&item)?;
        let sql = format!(
            "INSERT INTO {} (id, type, data) VALUES ($1, $2, $3)
             ON CONFLICT (id, type) DO UPDATE SET data = EXCLUDED.data",
            self.quoted_table()
        );
        sqlx::query(&sql)
            .bind(&key.id)
            .bind(key.entity_type.as_str())
            .bind(Value::Object(item))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert(&self, item: Item) -> Result<(), StoreError> {
        let key = EntityKey::from_item(&item)?;
        let sql = format!(
            "INSERT INTO {} (id, type, data) VALUES ($1, $2, $3)
             ON CONFLICT (id, type) DO NOTHING",
            self.quoted_table()
        );
        let result = sqlx::query(&sql)
            .bind(&key.id)
            .bind(key.entity_type.as_str())
            .bind(Value::Object(item))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists(key));
        }
        Ok(())
    }

    async fn get(&self, key: &EntityKey) -> Result<Option<Item>, StoreError> {
        let sql = format!(
            "SELECT data FROM {} WHERE id = $1 AND type = $2",
            self.quoted_table()
        );
        let row = sqlx::query_scalar::<_, Value>(&sql)
            .bind(&key.id)
            .bind(key.entity_type.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.map(into_item).transpose()
    }

    async fn apply_update(&self, key: &EntityKey, update: &UpdateExpression) -> Result<Item, StoreError> {
        let sql = format!(
            "UPDATE {} SET data = data || {} WHERE id = $1 AND type = $2 RETURNING data",
            self.quoted_table(),
            Self::merge_object_sql(update, 3)
        );

        let mut query = sqlx::query_scalar::<_, Value>(&sql)
            .bind(key.id.clone())
            .bind(key.entity_type.as_str());
        for (field, value) in update.assignments() {
            query = query.bind(field.to_string()).bind(value.clone());
        }

        match query.fetch_optional(&self.pool).await? {
            Some(value) => into_item(value),
            None => Err(StoreError::NotFound(key.clone())),
        }
    }

    async fn remove(&self, key: &EntityKey) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE id = $1 AND type = $2", self.quoted_table());
        let result = sqlx::query(&sql)
            .bind(&key.id)
            .bind(key.entity_type.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn scan(&self, filter: &ScanFilter) -> Result<Vec<Item>, StoreError> {
        let rows = match &filter.owner {
            Some((field, value)) => {
                let sql = format!(
                    "SELECT data FROM {} WHERE type = $1 AND data->>$2 = $3",
                    self.quoted_table()
                );
                sqlx::query_scalar::<_, Value>(&sql)
                    .bind(filter.entity_type.as_str())
                    .bind(field)
                    .bind(value)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT data FROM {} WHERE type = $1", self.quoted_table());
                sqlx::query_scalar::<_, Value>(&sql)
                    .bind(filter.entity_type.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.into_iter().map(into_item).collect()
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
