//! Source Reader
//!
//! Fetches a remote delimited-text resource and decodes it into a lazy,
//! finite sequence of typed batches. Fetching and decoding are split:
//! [`fetch::Fetcher`] performs one HTTP GET (plus gzip decompression) and
//! [`reader::SourceReader`] turns the fetched bytes into a single-pass
//! [`reader::BatchReader`].

pub mod fetch;
pub mod reader;

pub use fetch::Fetcher;
pub use reader::{BatchReader, SourceReader};
