//! SQLite implementation of IPreferenceStore
//!
//! Persists user preferences as a simple key-value table. Booleans are
//! stored as the literal strings `"true"` / `"false"`.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use paza_core::ports::IPreferenceStore;

use crate::StoreError;

/// SQLite-based implementation of the preference store port
pub struct SqlitePreferenceStore {
    pool: SqlitePool,
}

impl SqlitePreferenceStore {
    /// Creates a new store instance with the given connection pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl IPreferenceStore for SqlitePreferenceStore {
    async fn get_bool(&self, key: &str) -> anyhow::Result<Option<bool>> {
        let row = sqlx::query("SELECT value FROM preferences WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            None => Ok(None),
            Some(row) => {
                let value: String = row.get("value");
                match value.as_str() {
                    "true" => Ok(Some(true)),
                    "false" => Ok(Some(false)),
                    other => Err(StoreError::SerializationError(format!(
                        "Unknown boolean value for preference '{}': {}",
                        key, other
                    ))
                    .into()),
                }
            }
        }
    }

    async fn set_bool(&self, key: &str, value: bool) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO preferences (key, value, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(if value { "true" } else { "false" })
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::debug!(key, value, "Preference persisted");
        Ok(())
    }
}
