//! PostgreSQL implementation of the entry store.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::{ENTRY_COLUMNS, EntryRecord, data_json, entry_from_record};
use crate::config::AppConfig;
use crate::domain::stats::month_bounds;
use crate::domain::{Entry, EntryId, EntryStats, NewEntry};
use crate::error::AppError;

/// PostgreSQL-backed entry store using `sqlx::PgPool`.
///
/// Every operation is a single statement, so the database provides the
/// isolation; no in-process locking is needed.
#[derive(Debug, Clone)]
pub struct PostgresEntryStore {
    pool: PgPool,
}

impl PostgresEntryStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects using the configured pool settings and applies the embedded
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] if the database is unreachable or a
    /// migration fails.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Persistence(e.to_string()))?;

        tracing::info!("postgres entry store ready");
        Ok(Self::new(pool))
    }

    /// Inserts a new entry and returns it as stored.
    ///
    /// `data` is sent as text and cast to `json`, so the server keeps each
    /// row's keys in the order they were submitted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on database failure.
    pub async fn create(&self, new: NewEntry) -> Result<Entry, AppError> {
        let entry = new.into_entry(Utc::now());
        let data = data_json(&entry.data)?;
        let sql = format!(
            "INSERT INTO excel_data ({ENTRY_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6::json, $7, $8, $9, $10) RETURNING {ENTRY_COLUMNS}"
        );
        let record = sqlx::query_as::<_, EntryRecord>(&sql)
            .bind(*entry.id.as_uuid())
            .bind(&entry.user_id)
            .bind(entry.month.as_str())
            .bind(entry.year)
            .bind(&entry.file_name)
            .bind(data)
            .bind(entry.record_count)
            .bind(entry.status.as_str())
            .bind(entry.created_at)
            .bind(entry.updated_at)
            .fetch_one(&self.pool)
            .await?;

        entry_from_record(record)
    }

    /// Fetches one entry by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EntryNotFound`] if no row matches, or
    /// [`AppError::Persistence`] on database failure.
    pub async fn get(&self, id: EntryId) -> Result<Entry, AppError> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM excel_data WHERE id = $1");
        let record = sqlx::query_as::<_, EntryRecord>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::EntryNotFound(id))?;

        entry_from_record(record)
    }

    /// Lists every entry, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on database failure.
    pub async fn list(&self) -> Result<Vec<Entry>, AppError> {
        let sql =
            format!("SELECT {ENTRY_COLUMNS} FROM excel_data ORDER BY created_at DESC, seq DESC");
        let records = sqlx::query_as::<_, EntryRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;

        records.into_iter().map(entry_from_record).collect()
    }

    /// Permanently deletes one entry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::EntryNotFound`] if no row matches, or
    /// [`AppError::Persistence`] on database failure.
    pub async fn delete(&self, id: EntryId) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM excel_data WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::EntryNotFound(id));
        }
        Ok(())
    }

    /// Computes the dashboard counters in one aggregate query.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Persistence`] on database failure.
    pub async fn stats_at(&self, now: DateTime<Utc>) -> Result<EntryStats, AppError> {
        let (start, end) = month_bounds(now);
        let (total_files, total_records, this_month) = sqlx::query_as::<_, (i64, i64, i64)>(
            "SELECT COUNT(*), \
                    COALESCE(SUM(record_count), 0)::BIGINT, \
                    COUNT(*) FILTER (WHERE created_at >= $1 AND created_at < $2) \
             FROM excel_data",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(EntryStats {
            total_files,
            total_records,
            this_month,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::Month;
    use serde_json::json;

    #[tokio::test]
    #[ignore = "needs a PostgreSQL server at DATABASE_URL"]
    async fn stored_rows_keep_column_order() {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            panic!("DATABASE_URL not set");
        };
        let Ok(pool) = PgPool::connect(&url).await else {
            panic!("connect failed");
        };
        tokio_test::assert_ok!(sqlx::migrate!("./migrations").run(&pool).await);
        let store = PostgresEntryStore::new(pool);

        let Some(row) = json!({"name": "bolt", "id": 7, "amount": 1}).as_object().cloned() else {
            panic!("expected object");
        };
        let new = NewEntry::counted(Month::March, 2024, None, vec![row]);
        let created = tokio_test::assert_ok!(store.create(new).await);
        let fetched = tokio_test::assert_ok!(store.get(created.id).await);
        tokio_test::assert_ok!(store.delete(created.id).await);

        for entry in [&created, &fetched] {
            let Some(first) = entry.data.first() else {
                panic!("no rows");
            };
            let keys: Vec<&str> = first.keys().map(String::as_str).collect();
            assert_eq!(keys, ["name", "id", "amount"]);
        }
    }
}
