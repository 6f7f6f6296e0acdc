use crate::error::BackendError;
use crate::sql_store::migrations::MigrationRunner;
use async_trait::async_trait;
use docgate_core::store::ensure_same_id;
use docgate_core::{
    item_id, stamp_system_properties, DocumentStore, PartitionKey, PartitionKeyPath, Query,
    ResourceKind, StoreError, StoreItem, StoreResult,
};
use serde_json::Value as JsonValue;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::PathBuf;
use std::str::FromStr;

/// SQLite-backed document store.
///
/// Items are kept as JSON text keyed by `(database, container, partition key, id)`.
/// Queries load a container in insertion order and evaluate in process.
#[derive(Debug, Clone)]
pub struct SqlDocumentStore {
    pool: SqlitePool,
}

impl SqlDocumentStore {
    /// Open (creating if missing) the database at `database_url` and apply migrations
    pub async fn new(database_url: &str) -> StoreResult<Self> {
        Self::new_with_config(database_url, None).await
    }

    /// Create a store with an explicit pool size
    pub async fn new_with_config(
        database_url: &str,
        max_connections: Option<u32>,
    ) -> StoreResult<Self> {
        let max_conn = max_connections.unwrap_or_else(|| {
            std::env::var("DOCGATE_DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10)
        });

        let options = if let Some(path_str) = database_url.strip_prefix("sqlite://") {
            let path = PathBuf::from(path_str);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Backend(format!(
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
            SqliteConnectOptions::new().filename(path).create_if_missing(true)
        } else {
            SqliteConnectOptions::from_str(database_url)
                .map_err(BackendError::Database)?
                .create_if_missing(true)
        };

        // every connection to sqlite::memory: is a separate database
        let max_conn = if database_url.contains(":memory:") { 1 } else { max_conn };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_conn)
            .connect_with(options.foreign_keys(true))
            .await
            .map_err(BackendError::Database)?;

        sqlx::query("PRAGMA journal_mode = WAL;")
            .execute(&pool)
            .await
            .map_err(BackendError::Database)?;
        sqlx::query("PRAGMA synchronous = NORMAL;")
            .execute(&pool)
            .await
            .map_err(BackendError::Database)?;

        let store = Self { pool };
        store.migrate().await?;
        tracing::debug!(url = database_url, max_connections = max_conn, "sqlite store ready");
        Ok(store)
    }

    /// Create a store from an existing pool (for testing)
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Run migrations manually
    pub async fn migrate(&self) -> StoreResult<()> {
        let runner = MigrationRunner::new(self.pool.clone());
        runner.migrate().await?;
        tracing::debug!(version = ?runner.current_version().await?, "schema up to date");
        Ok(())
    }

    async fn ensure_database(&self, database: &str) -> StoreResult<()> {
        let exists: Option<String> = sqlx::query_scalar("SELECT name FROM databases WHERE name = ?")
            .bind(database)
            .fetch_optional(&self.pool)
            .await
            .map_err(BackendError::Database)?;
        match exists {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found(ResourceKind::Database, database)),
        }
    }

    /// Resolve a container, reporting which of database or container is missing
    async fn partition_key_path(&self, database: &str, container: &str) -> StoreResult<PartitionKeyPath> {
        let path: Option<String> = sqlx::query_scalar(
            "SELECT partition_key_path FROM containers WHERE database_name = ? AND name = ?",
        )
        .bind(database)
        .bind(container)
        .fetch_optional(&self.pool)
        .await
        .map_err(BackendError::Database)?;

        match path {
            Some(path) => PartitionKeyPath::new(path),
            None => {
                self.ensure_database(database).await?;
                Err(StoreError::not_found(ResourceKind::Container, container))
            }
        }
    }
}

fn decode_body(body: &str) -> StoreResult<StoreItem> {
    match serde_json::from_str::<JsonValue>(body).map_err(BackendError::Serialization)? {
        JsonValue::Object(map) => Ok(map),
        other => Err(BackendError::Corrupt(format!("stored item is not an object: {}", other)).into()),
    }
}

fn encode_body(item: &StoreItem) -> StoreResult<String> {
    serde_json::to_string(item).map_err(|e| BackendError::Serialization(e).into())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            matches!(db_err.code().as_deref(), Some("1555") | Some("2067"))
        }
        _ => false,
    }
}

fn already_exists(id: &str, partition_key: &PartitionKey) -> StoreError {
    StoreError::Conflict(format!("Item '{}' already exists in partition '{}'", id, partition_key))
}

#[async_trait]
impl DocumentStore for SqlDocumentStore {
    async fn list_databases(&self) -> StoreResult<Vec<String>> {
        let names = sqlx::query_scalar("SELECT name FROM databases ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(BackendError::Database)?;
        Ok(names)
    }

    async fn create_database(&self, name: &str) -> StoreResult<()> {
        sqlx::query("INSERT OR IGNORE INTO databases (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(BackendError::Database)?;
        Ok(())
    }

    async fn list_containers(&self, database: &str) -> StoreResult<Vec<String>> {
        self.ensure_database(database).await?;
        let names = sqlx::query_scalar(
            "SELECT name FROM containers WHERE database_name = ? ORDER BY name",
        )
        .bind(database)
        .fetch_all(&self.pool)
        .await
        .map_err(BackendError::Database)?;
        Ok(names)
    }

    async fn create_container(
        &self,
        database: &str,
        name: &str,
        partition_key_path: &PartitionKeyPath,
    ) -> StoreResult<()> {
        self.ensure_database(database).await?;
        sqlx::query(
            "INSERT OR IGNORE INTO containers (database_name, name, partition_key_path) VALUES (?, ?, ?)",
        )
        .bind(database)
        .bind(name)
        .bind(partition_key_path.as_str())
        .execute(&self.pool)
        .await
        .map_err(BackendError::Database)?;
        Ok(())
    }

    async fn query_items(
        &self,
        database: &str,
        container: &str,
        sql: &str,
    ) -> StoreResult<Vec<JsonValue>> {
        let items = self.read_all_items(database, container).await?;
        let query = Query::parse(sql)?;
        Ok(query.execute(items.iter()))
    }

    async fn read_all_items(&self, database: &str, container: &str) -> StoreResult<Vec<StoreItem>> {
        self.partition_key_path(database, container).await?;
        let rows = sqlx::query(
            "SELECT body FROM items WHERE database_name = ? AND container_name = ? ORDER BY seq",
        )
        .bind(database)
        .bind(container)
        .fetch_all(&self.pool)
        .await
        .map_err(BackendError::Database)?;

        rows.iter().map(|row| decode_body(&row.get::<String, _>("body"))).collect()
    }

    async fn read_item(
        &self,
        database: &str,
        container: &str,
        id: &str,
        partition_key: &PartitionKey,
    ) -> StoreResult<StoreItem> {
        self.partition_key_path(database, container).await?;
        let body: Option<String> = sqlx::query_scalar(
            r#"
            SELECT body FROM items
            WHERE database_name = ? AND container_name = ? AND partition_key = ? AND id = ?
            "#,
        )
        .bind(database)
        .bind(container)
        .bind(partition_key.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(BackendError::Database)?;

        match body {
            Some(body) => decode_body(&body),
            None => Err(StoreError::not_found(ResourceKind::Item, id)),
        }
    }

    async fn delete_item(
        &self,
        database: &str,
        container: &str,
        id: &str,
        partition_key: &PartitionKey,
    ) -> StoreResult<()> {
        self.partition_key_path(database, container).await?;
        let result = sqlx::query(
            r#"
            DELETE FROM items
            WHERE database_name = ? AND container_name = ? AND partition_key = ? AND id = ?
            "#,
        )
        .bind(database)
        .bind(container)
        .bind(partition_key.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(BackendError::Database)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(ResourceKind::Item, id));
        }
        Ok(())
    }

    async fn upsert_item(
        &self,
        database: &str,
        container: &str,
        mut item: StoreItem,
    ) -> StoreResult<StoreItem> {
        let path = self.partition_key_path(database, container).await?;
        let id = item_id(&item)?.to_string();
        let partition_key = path.partition_key_of(&item);
        stamp_system_properties(&mut item);
        let body = encode_body(&item)?;

        sqlx::query(
            r#"
            INSERT INTO items (database_name, container_name, partition_key, id, body)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(database_name, container_name, partition_key, id)
            DO UPDATE SET body = excluded.body, updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(database)
        .bind(container)
        .bind(partition_key.as_str())
        .bind(&id)
        .bind(&body)
        .execute(&self.pool)
        .await
        .map_err(BackendError::Database)?;

        Ok(item)
    }

    async fn create_item(
        &self,
        database: &str,
        container: &str,
        mut item: StoreItem,
    ) -> StoreResult<StoreItem> {
        let path = self.partition_key_path(database, container).await?;
        let id = item_id(&item)?.to_string();
        let partition_key = path.partition_key_of(&item);
        stamp_system_properties(&mut item);
        let body = encode_body(&item)?;

        let result = sqlx::query(
            r#"
            INSERT INTO items (database_name, container_name, partition_key, id, body)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(database)
        .bind(container)
        .bind(partition_key.as_str())
        .bind(&id)
        .bind(&body)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(item),
            Err(e) if is_unique_violation(&e) => Err(already_exists(&id, &partition_key)),
            Err(e) => Err(BackendError::Database(e).into()),
        }
    }

    /// Delete and insert inside one transaction
    async fn rekey_item(
        &self,
        database: &str,
        container: &str,
        id: &str,
        old_partition_key: &PartitionKey,
        mut new_item: StoreItem,
    ) -> StoreResult<StoreItem> {
        ensure_same_id(id, &new_item)?;
        let path = self.partition_key_path(database, container).await?;
        let new_partition_key = path.partition_key_of(&new_item);
        stamp_system_properties(&mut new_item);
        let body = encode_body(&new_item)?;

        if &new_partition_key == old_partition_key {
            // same row, so the item keeps its place in scan order
            let updated = sqlx::query(
                r#"
                UPDATE items SET body = ?, updated_at = CURRENT_TIMESTAMP
                WHERE database_name = ? AND container_name = ? AND partition_key = ? AND id = ?
                "#,
            )
            .bind(&body)
            .bind(database)
            .bind(container)
            .bind(old_partition_key.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(BackendError::Database)?;

            if updated.rows_affected() == 0 {
                return Err(StoreError::not_found(ResourceKind::Item, id));
            }
            return Ok(new_item);
        }

        let mut tx = self.pool.begin().await.map_err(BackendError::Database)?;

        let deleted = sqlx::query(
            r#"
            DELETE FROM items
            WHERE database_name = ? AND container_name = ? AND partition_key = ? AND id = ?
            "#,
        )
        .bind(database)
        .bind(container)
        .bind(old_partition_key.as_str())
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(BackendError::Database)?;

        if deleted.rows_affected() == 0 {
            return Err(StoreError::not_found(ResourceKind::Item, id));
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO items (database_name, container_name, partition_key, id, body)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(database)
        .bind(container)
        .bind(new_partition_key.as_str())
        .bind(id)
        .bind(&body)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            // dropping the transaction rolls back the delete
            Err(e) if is_unique_violation(&e) => return Err(already_exists(id, &new_partition_key)),
            Err(e) => return Err(BackendError::Database(e).into()),
        }

        tx.commit().await.map_err(BackendError::Database)?;
        Ok(new_item)
    }
}
