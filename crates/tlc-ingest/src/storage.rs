//! Storage layer for the destination table
//!
//! Two operations against PostgreSQL, and nothing else: replace the
//! destination table from the declared schema, and append one batch of rows.
//! The table is never read back.

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Duration;
use tlc_common::{IngestError, Result};
use tracing::{debug, info};

use crate::config::{DbConfig, DATABASE_CONNECT_TIMEOUT_SECS, DATABASE_MAX_CONNECTIONS};
use crate::record::{Batch, Row, Value};
use crate::schema::TableSchema;

/// PostgreSQL limit on bind parameters per statement
const POSTGRES_BIND_LIMIT: usize = 65_535;

/// Connect to the destination database
pub async fn connect(config: &DbConfig) -> Result<PgPool> {
    config.validate()?;

    let pool = PgPoolOptions::new()
        .max_connections(DATABASE_MAX_CONNECTIONS)
        .acquire_timeout(Duration::from_secs(DATABASE_CONNECT_TIMEOUT_SECS))
        .connect(&config.url())
        .await
        .map_err(|e| {
            IngestError::Database(format!(
                "failed to connect to {}:{}/{}: {}",
                config.host, config.port, config.database, e
            ))
        })?;

    Ok(pool)
}

/// Storage handler for one destination table
pub struct TripStorage {
    db: PgPool,
    table: String,
    schema: TableSchema,
}

impl TripStorage {
    /// Create a storage handler
    ///
    /// The table name must already be validated as a bare identifier; it is
    /// interpolated into DDL below.
    pub fn new(db: PgPool, table: impl Into<String>, schema: TableSchema) -> Self {
        Self {
            db,
            table: table.into(),
            schema,
        }
    }

    /// Drop and recreate the destination table from the schema
    ///
    /// Destructive and idempotent by overwrite: prior contents are
    /// discarded, not migrated. Runs exactly once per ingestion run, before
    /// any append.
    pub async fn replace_table(&self) -> Result<()> {
        let mut tx = self
            .db
            .begin()
            .await
            .map_err(|e| IngestError::Database(format!("failed to begin transaction: {}", e)))?;

        sqlx::query(&format!("DROP TABLE IF EXISTS \"{}\"", self.table))
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                IngestError::Database(format!("failed to drop table {}: {}", self.table, e))
            })?;

        sqlx::query(&self.schema.create_table_sql(&self.table))
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                IngestError::Database(format!("failed to create table {}: {}", self.table, e))
            })?;

        tx.commit()
            .await
            .map_err(|e| IngestError::Database(format!("failed to commit schema: {}", e)))?;

        info!(table = %self.table, columns = self.schema.len(), "Replaced destination table");
        Ok(())
    }

    /// Append one batch to the destination table
    ///
    /// The whole batch runs inside a single transaction: a failure rolls the
    /// batch back entirely, leaving earlier batches committed. The INSERT
    /// statements inside are sized to the bind-parameter limit; the
    /// splitting is invisible to atomicity.
    pub async fn append_batch(&self, batch: &Batch) -> Result<()> {
        let mut tx = self
            .db
            .begin()
            .await
            .map_err(|e| IngestError::Database(format!("failed to begin transaction: {}", e)))?;

        for rows in batch.rows.chunks(self.rows_per_insert()) {
            let mut builder = self.insert_builder(rows);
            builder.build().execute(&mut *tx).await.map_err(|e| {
                IngestError::Database(format!(
                    "failed to append batch {} to {}: {}",
                    batch.index, self.table, e
                ))
            })?;
        }

        tx.commit().await.map_err(|e| {
            IngestError::Database(format!("failed to commit batch {}: {}", batch.index, e))
        })?;

        debug!(batch = batch.index, rows = batch.len(), "Appended batch");
        Ok(())
    }

    /// Rows per INSERT statement under the bind-parameter limit
    fn rows_per_insert(&self) -> usize {
        (POSTGRES_BIND_LIMIT / self.schema.len().max(1)).max(1)
    }

    /// Multi-row INSERT builder for a slice of rows
    fn insert_builder(&self, rows: &[Row]) -> QueryBuilder<'_, Postgres> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO \"{}\" ({}) ",
            self.table,
            self.schema.insert_columns_sql()
        ));

        builder.push_values(rows, |mut b, row| {
            for value in &row.values {
                match value {
                    Value::Integer(v) => b.push_bind(*v),
                    Value::Float(v) => b.push_bind(*v),
                    Value::Text(v) => b.push_bind(v.clone()),
                    Value::Timestamp(v) => b.push_bind(*v),
                };
            }
        });

        builder
    }
}
