//! TLC Ingest - NYC taxi trip data ingestion tool

use anyhow::Result;
use clap::{Args, Parser};
use tlc_common::logging::{init_logging, LogConfig, LogLevel};
use tlc_ingest::config::{validate_month, DbConfig, IngestConfig, DEFAULT_CHUNK_SIZE, DEFAULT_DB_PORT};
use tlc_ingest::dataset::Dataset;
use tlc_ingest::pipeline::IngestPipeline;
use tlc_ingest::schema::TableSchema;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "tlc-ingest")]
#[command(author, version, about = "NYC TLC trip data ingestion tool")]
struct Cli {
    /// What to ingest
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Command {
    /// Ingest one monthly trip file
    Trips {
        /// Trip dataset to ingest
        #[arg(long, value_enum, default_value_t = Dataset::Yellow)]
        dataset: Dataset,

        /// Year of the monthly file
        #[arg(long)]
        year: u16,

        /// Month of the monthly file (1-12)
        #[arg(long)]
        month: u8,

        /// Destination table (defaults to the dataset's table)
        #[arg(long)]
        table: Option<String>,

        /// Rows per batch
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        #[command(flatten)]
        db: DbArgs,
    },

    /// Ingest the taxi zone lookup table
    Zones {
        /// Destination table
        #[arg(long)]
        table: Option<String>,

        /// Rows per batch
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        #[command(flatten)]
        db: DbArgs,
    },
}

/// Database connection parameters
#[derive(Args, Debug)]
struct DbArgs {
    /// Database host
    #[arg(long, env = "TLC_DB_HOST")]
    db_host: String,

    /// Database port
    #[arg(long, env = "TLC_DB_PORT", default_value_t = DEFAULT_DB_PORT)]
    db_port: u16,

    /// Database user
    #[arg(long, env = "TLC_DB_USER")]
    db_user: String,

    /// Database password
    #[arg(long, env = "TLC_DB_PASSWORD")]
    db_password: String,

    /// Database name
    #[arg(long, env = "TLC_DB_NAME")]
    db_name: String,
}

impl From<DbArgs> for DbConfig {
    fn from(args: DbArgs) -> Self {
        DbConfig {
            host: args.db_host,
            port: args.db_port,
            user: args.db_user,
            password: args.db_password,
            database: args.db_name,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on verbose flag
    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("tlc-ingest".to_string())
        .build();

    // Merge with environment variables (they take precedence)
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    init_logging(&log_config)?;

    match cli.command {
        Command::Trips {
            dataset,
            year,
            month,
            table,
            chunk_size,
            db,
        } => {
            validate_month(month)?;
            let url = dataset.trip_url(year, month)?;
            let table = table.unwrap_or_else(|| dataset.default_table().to_string());
            info!(dataset = %dataset, year, month, "Ingesting trip data");
            ingest(db.into(), dataset.schema(), url, table, chunk_size).await?;
        }
        Command::Zones { table, chunk_size, db } => {
            let table = table.unwrap_or_else(|| Dataset::Zones.default_table().to_string());
            info!("Ingesting zone lookup");
            ingest(
                db.into(),
                Dataset::Zones.schema(),
                Dataset::zones_url(),
                table,
                chunk_size,
            )
            .await?;
        }
    }

    info!("Ingestion complete");
    Ok(())
}

/// Validate configuration, connect, and run one ingestion
async fn ingest(
    db: DbConfig,
    schema: TableSchema,
    source_url: String,
    table: String,
    chunk_size: usize,
) -> Result<()> {
    let config = IngestConfig {
        source_url,
        table: table.clone(),
        chunk_size,
    };

    // Fail on bad parameters before any network or database activity
    db.validate()?;
    config.validate()?;

    let pool = tlc_ingest::storage::connect(&db).await?;

    let result = IngestPipeline::new(config, schema, pool).run().await?;
    info!("{}", result.summary(&table));

    Ok(())
}
