//! TLC Ingest Library
//!
//! Ingests NYC Taxi & Limousine Commission trip data into PostgreSQL.
//!
//! The pipeline fetches a gzip-compressed CSV release for one dataset and
//! month, decodes it against a statically declared column schema in
//! fixed-size batches, replaces the destination table from that schema, and
//! appends every batch in source order.
//!
//! # Example
//!
//! ```no_run
//! use tlc_ingest::config::{DbConfig, IngestConfig, DEFAULT_CHUNK_SIZE};
//! use tlc_ingest::dataset::Dataset;
//! use tlc_ingest::pipeline::IngestPipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = DbConfig {
//!         host: "localhost".into(),
//!         port: 5432,
//!         user: "postgres".into(),
//!         password: "postgres".into(),
//!         database: "ny_taxi".into(),
//!     };
//!
//!     let dataset = Dataset::Yellow;
//!     let config = IngestConfig {
//!         source_url: dataset.trip_url(2021, 1)?,
//!         table: dataset.default_table().to_string(),
//!         chunk_size: DEFAULT_CHUNK_SIZE,
//!     };
//!
//!     let pool = tlc_ingest::storage::connect(&db).await?;
//!     let result = IngestPipeline::new(config, dataset.schema(), pool).run().await?;
//!     println!("{}", result.summary(dataset.default_table()));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dataset;
pub mod pipeline;
pub mod record;
pub mod schema;
pub mod source;
pub mod storage;
