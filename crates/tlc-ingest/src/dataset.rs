//! Dataset catalog
//!
//! The TLC trip-record archive publishes one gzip-compressed CSV per dataset
//! per month, plus a small uncompressed zone-lookup CSV, at predictable URLs
//! keyed by dataset name and year/month. This module owns those URLs, the
//! per-dataset column schemas, and the default destination table names.

use clap::ValueEnum;
use tlc_common::{IngestError, Result};

use crate::schema::{Column, ColumnType, TableSchema};

/// Base URL of the trip-record release archive
pub const RELEASE_BASE_URL: &str =
    "https://github.com/DataTalksClub/nyc-tlc-data/releases/download";

/// Which archive dataset to ingest
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Dataset {
    /// Yellow (medallion) taxi trip records
    Yellow,
    /// Green (street-hail livery) taxi trip records
    Green,
    /// Taxi zone lookup table
    Zones,
}

impl Dataset {
    /// Archive name of the dataset, as used in release URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::Yellow => "yellow",
            Dataset::Green => "green",
            Dataset::Zones => "zones",
        }
    }

    /// Default destination table for the dataset
    pub fn default_table(&self) -> &'static str {
        match self {
            Dataset::Yellow => "yellow_taxi_trips",
            Dataset::Green => "green_taxi_trips",
            Dataset::Zones => "taxi_zones",
        }
    }

    /// URL of the monthly trip file for this dataset
    ///
    /// Only the trip datasets are monthly; the zone lookup has a single
    /// unversioned file, see [`Dataset::zones_url`].
    pub fn trip_url(&self, year: u16, month: u8) -> Result<String> {
        match self {
            Dataset::Yellow | Dataset::Green => Ok(format!(
                "{}/{}/{}_tripdata_{}-{:02}.csv.gz",
                RELEASE_BASE_URL,
                self.as_str(),
                self.as_str(),
                year,
                month
            )),
            Dataset::Zones => Err(IngestError::config(
                "zone lookup is not a monthly dataset; use zones_url()",
            )),
        }
    }

    /// URL of the taxi zone lookup CSV
    pub fn zones_url() -> String {
        format!("{}/misc/taxi_zone_lookup.csv", RELEASE_BASE_URL)
    }

    /// Declared column schema for the dataset
    pub fn schema(&self) -> TableSchema {
        let columns = match self {
            Dataset::Yellow => vec![
                Column::new("VendorID", ColumnType::Integer),
                Column::new("tpep_pickup_datetime", ColumnType::Timestamp),
                Column::new("tpep_dropoff_datetime", ColumnType::Timestamp),
                Column::new("passenger_count", ColumnType::Integer),
                Column::new("trip_distance", ColumnType::Float),
                Column::new("RatecodeID", ColumnType::Integer),
                Column::new("store_and_fwd_flag", ColumnType::Text),
                Column::new("PULocationID", ColumnType::Integer),
                Column::new("DOLocationID", ColumnType::Integer),
                Column::new("payment_type", ColumnType::Integer),
                Column::new("fare_amount", ColumnType::Float),
                Column::new("extra", ColumnType::Float),
                Column::new("mta_tax", ColumnType::Float),
                Column::new("tip_amount", ColumnType::Float),
                Column::new("tolls_amount", ColumnType::Float),
                Column::new("improvement_surcharge", ColumnType::Float),
                Column::new("total_amount", ColumnType::Float),
                Column::new("congestion_surcharge", ColumnType::Float),
            ],
            Dataset::Green => vec![
                Column::new("VendorID", ColumnType::Integer),
                Column::new("lpep_pickup_datetime", ColumnType::Timestamp),
                Column::new("lpep_dropoff_datetime", ColumnType::Timestamp),
                Column::new("store_and_fwd_flag", ColumnType::Text),
                Column::new("RatecodeID", ColumnType::Integer),
                Column::new("PULocationID", ColumnType::Integer),
                Column::new("DOLocationID", ColumnType::Integer),
                Column::new("passenger_count", ColumnType::Integer),
                Column::new("trip_distance", ColumnType::Float),
                Column::new("fare_amount", ColumnType::Float),
                Column::new("extra", ColumnType::Float),
                Column::new("mta_tax", ColumnType::Float),
                Column::new("tip_amount", ColumnType::Float),
                Column::new("tolls_amount", ColumnType::Float),
                Column::new("ehail_fee", ColumnType::Float),
                Column::new("improvement_surcharge", ColumnType::Float),
                Column::new("total_amount", ColumnType::Float),
                Column::new("payment_type", ColumnType::Integer),
                Column::new("trip_type", ColumnType::Integer),
                Column::new("congestion_surcharge", ColumnType::Float),
            ],
            Dataset::Zones => vec![
                Column::new("LocationID", ColumnType::Integer),
                Column::new("Borough", ColumnType::Text),
                Column::new("Zone", ColumnType::Text),
                Column::new("service_zone", ColumnType::Text),
            ],
        };

        // Schemas above are static and duplicate-free.
        #[allow(clippy::unwrap_used)]
        TableSchema::new(columns).unwrap()
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trip_url_yellow() {
        let url = Dataset::Yellow.trip_url(2021, 1).unwrap();
        assert_eq!(
            url,
            "https://github.com/DataTalksClub/nyc-tlc-data/releases/download/yellow/yellow_tripdata_2021-01.csv.gz"
        );
    }

    #[test]
    fn test_trip_url_green_pads_month() {
        let url = Dataset::Green.trip_url(2020, 9).unwrap();
        assert!(url.ends_with("green/green_tripdata_2020-09.csv.gz"));
    }

    #[test]
    fn test_trip_url_rejected_for_zones() {
        assert!(Dataset::Zones.trip_url(2021, 1).is_err());
    }

    #[test]
    fn test_zones_url() {
        assert_eq!(
            Dataset::zones_url(),
            "https://github.com/DataTalksClub/nyc-tlc-data/releases/download/misc/taxi_zone_lookup.csv"
        );
    }

    #[test]
    fn test_default_tables() {
        assert_eq!(Dataset::Yellow.default_table(), "yellow_taxi_trips");
        assert_eq!(Dataset::Green.default_table(), "green_taxi_trips");
        assert_eq!(Dataset::Zones.default_table(), "taxi_zones");
    }

    #[test]
    fn test_yellow_schema_shape() {
        let schema = Dataset::Yellow.schema();
        assert_eq!(schema.len(), 18);
        assert_eq!(schema.position("tpep_pickup_datetime"), Some(1));
        assert_eq!(
            schema.columns()[1].ty,
            crate::schema::ColumnType::Timestamp
        );
    }

    #[test]
    fn test_green_schema_uses_lpep_timestamps() {
        let schema = Dataset::Green.schema();
        assert!(schema.position("lpep_pickup_datetime").is_some());
        assert!(schema.position("tpep_pickup_datetime").is_none());
    }

    #[test]
    fn test_zones_schema_shape() {
        let schema = Dataset::Zones.schema();
        assert_eq!(schema.len(), 4);
        assert_eq!(schema.position("LocationID"), Some(0));
    }
}
