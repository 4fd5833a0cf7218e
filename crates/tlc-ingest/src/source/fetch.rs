//! HTTP fetch and decompression
//!
//! One GET per fetch, no retry: a fetch failure is fatal for the run. Gzip
//! payloads are recognized by magic bytes so the same path serves the
//! compressed monthly trip files and the plain zone-lookup CSV.

use flate2::read::GzDecoder;
use reqwest::Client;
use std::io::Read;
use std::time::Duration;
use tlc_common::{IngestError, Result};
use tracing::{debug, info};

use crate::config::FETCH_TIMEOUT_SECS;

/// Gzip stream magic bytes
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// HTTP client for fetching source resources
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Create a new fetcher
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .user_agent("tlc-ingest/0.1")
            .build()
            .map_err(|e| IngestError::Fetch(format!("failed to build HTTP client: {}", e)))?;

        Ok(Fetcher { client })
    }

    /// Fetch a resource and return its decoded bytes
    ///
    /// Non-2xx responses and transport failures are fetch errors; a payload
    /// that starts with the gzip magic but fails to decompress is a
    /// decompression error.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        info!(url = %url, "Fetching source resource");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| IngestError::Fetch(format!("GET {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(IngestError::Fetch(format!(
                "GET {} returned {}",
                url,
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| IngestError::Fetch(format!("reading body of {} failed: {}", url, e)))?;

        info!(bytes = body.len(), "Fetched source resource");

        maybe_decompress(&body)
    }
}

/// Decompress gzip data, or pass plain data through
pub fn maybe_decompress(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < 2 || data[..2] != GZIP_MAGIC {
        return Ok(data.to_vec());
    }

    let mut decoder = GzDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| IngestError::Decompress(e.to_string()))?;

    debug!(
        compressed = data.len(),
        decompressed = decompressed.len(),
        "Decompressed gzip payload"
    );

    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn gzip(content: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(content).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_decompress_gzip_payload() {
        let original = b"a,b\n1,2\n";
        let decoded = maybe_decompress(&gzip(original)).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_plain_payload_passes_through() {
        let plain = b"a,b\n1,2\n";
        let decoded = maybe_decompress(plain).unwrap();
        assert_eq!(decoded, plain);
    }

    #[test]
    fn test_truncated_gzip_is_an_error() {
        let mut data = gzip(b"a,b\n1,2\n");
        data.truncate(data.len() / 2);
        let err = maybe_decompress(&data).unwrap_err();
        assert!(matches!(err, IngestError::Decompress(_)));
    }

    #[test]
    fn test_empty_payload_passes_through() {
        assert_eq!(maybe_decompress(b"").unwrap(), Vec::<u8>::new());
    }
}
