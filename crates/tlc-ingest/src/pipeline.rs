//! Ingestion pipeline
//!
//! Orchestrates one ingestion run: fetch and decode the source, replace the
//! destination table, append every batch in order. Strictly sequential; the
//! next batch is not decoded until the previous one is committed.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use sqlx::PgPool;
use tracing::{debug, info};

use crate::config::IngestConfig;
use crate::schema::TableSchema;
use crate::source::SourceReader;
use crate::storage::TripStorage;

/// State of one ingestion run
///
/// `SchemaCreated` is never skipped: loading begins only after the
/// destination table has been replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    SchemaCreated,
    Loading,
    Done,
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Init => "init",
            RunState::SchemaCreated => "schema_created",
            RunState::Loading => "loading",
            RunState::Done => "done",
            RunState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ingestion pipeline for one run
pub struct IngestPipeline {
    config: IngestConfig,
    schema: TableSchema,
    db: PgPool,
}

impl IngestPipeline {
    /// Create a new pipeline
    pub fn new(config: IngestConfig, schema: TableSchema, db: PgPool) -> Self {
        Self { config, schema, db }
    }

    /// Run the full ingestion pipeline
    ///
    /// Steps:
    /// 1. Validate the run configuration
    /// 2. Fetch and decode the source resource
    /// 3. Replace the destination table from the schema
    /// 4. Append every batch, in source order
    ///
    /// Returns: counts of what was loaded
    pub async fn run(&self) -> Result<PipelineResult> {
        info!(
            url = %self.config.source_url,
            table = %self.config.table,
            chunk_size = self.config.chunk_size,
            "Starting ingestion run"
        );

        self.config
            .validate()
            .context("configuration validation failed")?;

        let mut state = RunState::Init;
        debug!(state = %state, "Run state initialized");

        // 1. Fetch and decode
        info!("Phase 1: Fetching source");
        let reader = SourceReader::new(
            self.config.source_url.clone(),
            self.schema.clone(),
            self.config.chunk_size,
        )?;
        let mut batches = reader.read().await.context("fetch stage failed")?;

        // 2. Replace destination table
        info!("Phase 2: Replacing destination table");
        let storage = TripStorage::new(self.db.clone(), self.config.table.clone(), self.schema.clone());
        storage
            .replace_table()
            .await
            .context("schema-create stage failed")?;
        state = RunState::SchemaCreated;
        debug!(state = %state, "Run state advanced");

        // 3. Append batches
        info!("Phase 3: Loading batches");
        state = RunState::Loading;
        debug!(state = %state, "Run state advanced");

        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .context("invalid progress template")?,
        );

        let mut batches_loaded = 0usize;
        let mut rows_loaded = 0usize;

        loop {
            let batch = match batches.next_batch() {
                Ok(Some(batch)) => batch,
                Ok(None) => break,
                Err(e) => {
                    progress.abandon();
                    return Err(e).with_context(|| {
                        format!("decode failed while reading batch {}", batches_loaded)
                    });
                }
            };

            let index = batch.index;
            let rows = batch.len();

            if let Err(e) = storage.append_batch(&batch).await {
                progress.abandon();
                return Err(e)
                    .with_context(|| format!("batch-append stage failed at batch {}", index));
            }

            batches_loaded += 1;
            rows_loaded += rows;

            progress.set_message(format!("batch {} · {} rows total", index, rows_loaded));
            info!(batch = index, rows = rows, rows_total = rows_loaded, "Batch committed");
        }

        state = RunState::Done;
        progress.finish_with_message(format!(
            "done · {} batches · {} rows",
            batches_loaded, rows_loaded
        ));

        info!(
            table = %self.config.table,
            batches = batches_loaded,
            rows = rows_loaded,
            state = %state,
            "Ingestion run completed"
        );

        Ok(PipelineResult {
            batches_loaded,
            rows_loaded,
            state,
        })
    }
}

/// Result of running the pipeline
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Batches committed to the destination table
    pub batches_loaded: usize,
    /// Total rows committed
    pub rows_loaded: usize,
    /// Terminal run state
    pub state: RunState,
}

impl PipelineResult {
    /// Get a summary message
    pub fn summary(&self, table: &str) -> String {
        format!(
            "Loaded {} rows into {} in {} batches",
            self.rows_loaded, table, self.batches_loaded
        )
    }
}
