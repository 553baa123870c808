//! Welcome Service Admin CLI
//!
//! Administrative CLI for inspecting and maintaining the records behind the
//! welcome service, and for checking a running server.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use welcome_service::{
    engine::{mongo_storage::DEFAULT_CONNECT_TIMEOUT, redact_uri, seed::DEFAULT_SEED_NAME},
    MongoConnector, MongoStorage, User, UserStorage,
};

#[derive(Parser)]
#[command(name = "welcome-admin")]
#[command(about = "Welcome Service Admin CLI - Inspect records and check the server")]
#[command(version = "1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// MongoDB connection string
    #[arg(long, env = "MONGO_URI", default_value = "mongodb://localhost:27017/test")]
    mongo_uri: String,

    /// Seconds to wait for the store to answer
    #[arg(long, env = "MONGO_CONNECT_TIMEOUT_SECS", default_value_t = DEFAULT_CONNECT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show record statistics
    Stats,

    /// List all records as JSON
    List,

    /// Insert one record
    Seed {
        /// Name of the record to insert
        #[arg(long, default_value = DEFAULT_SEED_NAME)]
        name: String,
    },

    /// Delete every record
    Purge {
        /// Confirm the deletion
        #[arg(long)]
        confirm: bool,
    },

    /// Call /health and /welcome on a running server
    Check {
        /// Base URL of the server
        #[arg(long, default_value = "http://localhost:4000")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Check { ref url } => check(url).await,
        Commands::Stats => {
            let storage = open_store(&cli).await?;
            let count = storage.count_users().await?;
            let first = storage.first_user().await?;

            println!("📊 Database: {}", storage.database_name());
            println!("   Records: {}", count);
            match first {
                Some(user) => println!("   First record: {} ({})", user.name, user.created_at),
                None => println!("   First record: none"),
            }
            if count > 1 {
                println!("   ⚠️  {} records present, /welcome only reports the first", count);
            }
            Ok(())
        }
        Commands::List => {
            let storage = open_store(&cli).await?;
            let users = storage.list_users().await?;
            println!("{}", serde_json::to_string_pretty(&users)?);
            Ok(())
        }
        Commands::Seed { ref name } => {
            let storage = open_store(&cli).await?;
            let user = storage.insert_user(User::new(name.clone())).await?;
            println!("✅ Inserted record for {}", user.name);
            Ok(())
        }
        Commands::Purge { confirm } => {
            if !confirm {
                bail!("refusing to delete records without --confirm");
            }
            let storage = open_store(&cli).await?;
            let removed = storage.delete_all_users().await?;
            warn!(removed, "purged all records");
            println!("🗑️  Deleted {} records", removed);
            Ok(())
        }
    }
}

async fn open_store(cli: &Cli) -> Result<MongoStorage> {
    info!("Connecting to {}", redact_uri(&cli.mongo_uri));
    MongoConnector::new(Duration::from_secs(cli.timeout_secs))
        .open(&cli.mongo_uri)
        .await
        .with_context(|| format!("could not reach {}", redact_uri(&cli.mongo_uri)))
}

async fn check(base_url: &str) -> Result<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;
    let base = base_url.trim_end_matches('/');

    let health: serde_json::Value = client
        .get(format!("{}/health", base))
        .send()
        .await
        .context("health request failed")?
        .json()
        .await?;
    println!("🩺 /health → store {}", health["store"]);

    let response = client
        .get(format!("{}/welcome", base))
        .send()
        .await
        .context("welcome request failed")?;
    let status = response.status();
    let body = response.text().await?;
    println!("👋 /welcome → {} {}", status.as_u16(), body);

    if !status.is_success() {
        bail!("/welcome answered {}", status);
    }
    Ok(())
}
