//! TLC Ingest Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging for the tlc-ingest workspace.
//!
//! # Overview
//!
//! This crate provides the functionality used across all workspace members:
//!
//! - **Error Handling**: the [`IngestError`] taxonomy and result alias
//! - **Logging**: `tracing` subscriber configuration and initialization
//!
//! # Example
//!
//! ```no_run
//! use tlc_common::{IngestError, Result};
//!
//! fn check_table_name(name: &str) -> Result<()> {
//!     if name.is_empty() {
//!         return Err(IngestError::Config("table name cannot be empty".into()));
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{IngestError, Result};
