//! Batch reader over a fetched resource
//!
//! [`SourceReader`] is the restartable half: every call to
//! [`SourceReader::read`] performs a fresh fetch and yields a new
//! [`BatchReader`]. The `BatchReader` itself is a single-pass cursor: it is
//! consumed by iteration and there is no rewind. Re-reading the source means
//! re-fetching it.

use std::io::Cursor;
use tlc_common::{IngestError, Result};
use tracing::debug;

use crate::record::{Batch, Row, Value};
use crate::schema::TableSchema;
use crate::source::Fetcher;

/// Restartable reader for one source resource
pub struct SourceReader {
    fetcher: Fetcher,
    url: String,
    schema: TableSchema,
    chunk_size: usize,
}

impl SourceReader {
    /// Create a reader for the given resource and schema
    pub fn new(url: impl Into<String>, schema: TableSchema, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(IngestError::config("chunk size must be greater than 0"));
        }
        Ok(Self {
            fetcher: Fetcher::new()?,
            url: url.into(),
            schema,
            chunk_size,
        })
    }

    /// Fetch the resource and return a fresh single-pass batch sequence
    pub async fn read(&self) -> Result<BatchReader> {
        let bytes = self.fetcher.fetch(&self.url).await?;
        BatchReader::open(bytes, self.schema.clone(), self.chunk_size)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Single-pass cursor over the batches of one fetched resource
///
/// Row order within and across batches matches the source file. Every batch
/// holds exactly `chunk_size` rows except possibly the last.
pub struct BatchReader {
    reader: csv::Reader<Cursor<Vec<u8>>>,
    schema: TableSchema,
    /// schema column index -> field index in the source records
    field_positions: Vec<usize>,
    chunk_size: usize,
    next_index: usize,
    /// 1-based source line of the next data record (line 1 is the header)
    line: u64,
    done: bool,
}

impl std::fmt::Debug for BatchReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchReader")
            .field("schema", &self.schema)
            .field("field_positions", &self.field_positions)
            .field("chunk_size", &self.chunk_size)
            .field("next_index", &self.next_index)
            .field("line", &self.line)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl BatchReader {
    /// Open a reader over decoded CSV bytes, validating the header
    ///
    /// The header must contain exactly the schema's column names; order may
    /// differ from the schema (rows are reordered into schema order), but a
    /// missing or unrecognized column is a configuration error.
    pub fn open(bytes: Vec<u8>, schema: TableSchema, chunk_size: usize) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(Cursor::new(bytes));

        let headers = reader
            .headers()
            .map_err(|e| IngestError::Decode(format!("failed to read CSV header: {}", e)))?
            .clone();

        let mut field_positions = Vec::with_capacity(schema.len());
        for column in schema.columns() {
            let pos = headers
                .iter()
                .position(|h| h == column.name)
                .ok_or_else(|| {
                    IngestError::Config(format!(
                        "source is missing declared column {:?}",
                        column.name
                    ))
                })?;
            field_positions.push(pos);
        }

        for header in headers.iter() {
            if schema.position(header).is_none() {
                return Err(IngestError::Config(format!(
                    "source has unrecognized column {:?}",
                    header
                )));
            }
        }

        debug!(columns = schema.len(), "Validated source header");

        Ok(Self {
            reader,
            schema,
            field_positions,
            chunk_size,
            next_index: 0,
            line: 2,
            done: false,
        })
    }

    /// Next batch in source order, or `None` when the source is exhausted
    ///
    /// A decode or coercion failure poisons the reader: the error is fatal
    /// for the run and iteration cannot resume past it.
    pub fn next_batch(&mut self) -> Result<Option<Batch>> {
        if self.done {
            return Ok(None);
        }

        let mut rows = Vec::with_capacity(self.chunk_size);
        let mut record = csv::StringRecord::new();

        while rows.len() < self.chunk_size {
            let more = self.reader.read_record(&mut record).map_err(|e| {
                self.done = true;
                IngestError::Decode(format!("line {}: {}", self.line, e))
            })?;

            if !more {
                self.done = true;
                break;
            }

            match self.decode_record(&record) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    self.done = true;
                    return Err(e);
                }
            }
            self.line += 1;
        }

        if rows.is_empty() {
            return Ok(None);
        }

        let batch = Batch {
            index: self.next_index,
            rows,
        };
        self.next_index += 1;
        Ok(Some(batch))
    }

    /// Decode one CSV record into a typed row in schema column order
    fn decode_record(&self, record: &csv::StringRecord) -> Result<Row> {
        let mut values = Vec::with_capacity(self.schema.len());
        for (column, &pos) in self.schema.columns().iter().zip(&self.field_positions) {
            let raw = record.get(pos).unwrap_or("");
            values.push(Value::coerce(raw, column.ty, &column.name, self.line)?);
        }
        Ok(Row::new(values))
    }
}
