//! CDP Ingest - Data ingestion tool

use anyhow::Result;
use cdp_common::logging::{init_logging, LogConfig, LogLevel};
use cdp_ingest::db;
use cdp_ingest::purchasing::{config::PurchasingConfig, pipeline::PurchasingPipeline};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "cdp-ingest")]
#[command(author, version, about = "CDP data ingestion tool")]
struct Cli {
    /// Data source to ingest
    #[command(subcommand)]
    source: Source,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Parser, Debug)]
enum Source {
    /// Ingest the flat purchasing export into the normalized schema
    Purchasing {
        /// Path to the CSV export (overrides INGEST_PURCHASING_INPUT)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging from the environment; the verbose flag wins
    let mut log_config = LogConfig::from_env();
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }
    init_logging(&log_config)?;

    match cli.source {
        Source::Purchasing { input } => {
            let mut config = PurchasingConfig::from_env();
            if let Some(input) = input {
                config.input = input;
            }

            let db_config = db::DbConfig::from_env()?;
            let pool = db::create_pool(&db_config).await?;
            db::health_check(&pool).await?;

            info!("Ingesting purchasing export");
            let pipeline = PurchasingPipeline::new(pool, config);
            let stats = pipeline.run().await?;

            info!(
                customers = stats.customers,
                email_lists = stats.email_lists,
                employees = stats.employees,
                purchases = stats.purchases,
                subscriptions = stats.subscriptions,
                returns = stats.returns,
                "All purchasing data uploaded"
            );
        },
    }

    info!("Ingestion complete");
    Ok(())
}
