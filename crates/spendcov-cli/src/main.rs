mod db;
mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::report::CoverageView;

#[derive(Debug, Parser)]
#[command(name = "spendcov-cli")]
#[command(about = "Brand coverage of the spend and patterns datasets")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List brands with spend in the reporting window
    Brands {
        /// Maximum number of brands to show
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show how many core places of a brand appear in spend and patterns
    Coverage {
        /// Case-sensitive substring matched against the brand column
        #[arg(long)]
        brand: String,
        /// Print the matching spend rows
        #[arg(long)]
        rows: bool,
        /// Print the distribution of transaction counts
        #[arg(long)]
        transactions_histogram: bool,
        /// Print the distribution of median spend per transaction
        #[arg(long)]
        median_spend_histogram: bool,
    },
    /// Database management commands
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
    /// Load a YAML warehouse fixture
    Seed {
        /// Path to the fixture file
        #[arg(long, default_value = "fixtures/sample_warehouse.yaml")]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("spendcov-cli: no command given; run with --help");
        return Ok(());
    };

    let config = spendcov_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let pool_config = spendcov_db::PoolConfig::from_app_config(&config);
    let pool = spendcov_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Brands { limit } => {
            let warehouse = spendcov_db::Warehouse::new(pool, config.coverage);
            report::run_brands(&warehouse, limit).await?;
        }
        Commands::Coverage {
            brand,
            rows,
            transactions_histogram,
            median_spend_histogram,
        } => {
            let warehouse = spendcov_db::Warehouse::new(pool, config.coverage);
            let view = CoverageView {
                rows,
                transactions_histogram,
                median_spend_histogram,
            };
            report::run_coverage(&warehouse, &brand, view).await?;
        }
        Commands::Db { command } => match command {
            DbCommands::Ping => db::run_db_ping(&pool).await?,
            DbCommands::Migrate => db::run_db_migrate(&pool).await?,
            DbCommands::Seed { file } => db::run_db_seed(&pool, &file).await?,
        },
    }

    Ok(())
}
