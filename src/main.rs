// src/main.rs

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::error;

use showsync::config::{Config, DEFAULT_BATCH_SIZE};
use showsync::db::{create_connection_pool, initialize_database};
use showsync::integrations::{IptvEditorClient, TmdbClient};
use showsync::repositories::{JsonLedgerRepository, JsonStateRepository, SqliteCacheRepository};
use showsync::services::{BatchService, OfflineCatalog, ResolverService, SampleService};
use showsync::{CacheRepository, MetadataProvider, PlaylistBackend};

#[derive(Parser, Debug)]
#[command(name = "showsync", version, about = "IPTV Editor show processor")]
struct Cli {
    /// Number of shows to process in one run
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Override the data directory (cache store, state file, ledger)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Load categories and shows from local JSON files instead of the backend
    #[arg(long, default_value_t = false)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
#[command(rename_all = "kebab-case")]
enum Commands {
    /// Fetch one sample response from each remote endpoint into samples/
    CollectSamples,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    config.batch_size = cli.batch_size;
    config.ensure_data_dir()?;

    // Cache store, shared by the clients and the resolver
    let pool = Arc::new(create_connection_pool(&config.cache_db_path())?);
    {
        let conn = pool.get()?;
        initialize_database(&conn)?;
    }
    let cache: Arc<dyn CacheRepository> = Arc::new(SqliteCacheRepository::new(pool));

    let provider: Arc<dyn MetadataProvider> = Arc::new(TmdbClient::new(
        config.tmdb_base_url.clone(),
        config.tmdb_api_key.clone(),
        cache.clone(),
    )?);
    let backend: Arc<dyn PlaylistBackend> = Arc::new(IptvEditorClient::new(
        config.iptveditor_base_url.clone(),
        config.iptveditor_token.clone(),
        config.iptveditor_playlist.clone(),
        cache.clone(),
    )?);

    match cli.command {
        Some(Commands::CollectSamples) => {
            let samples = SampleService::new(provider, backend, config.samples_dir());
            samples.collect().await?;
        }
        None => {
            let resolver =
                ResolverService::new(provider, cache.clone(), config.fallback_to_first_result);
            let offline = cli.offline.then(|| OfflineCatalog {
                categories_path: config.categories_file_path(),
                shows_path: config.shows_file_path(),
            });

            let batch = BatchService::new(
                backend,
                resolver,
                cache,
                Arc::new(JsonStateRepository::new(config.state_file_path())),
                Arc::new(JsonLedgerRepository::new(config.ledger_file_path())),
                config.batch_size,
                offline,
            );
            batch.run().await?;
        }
    }

    Ok(())
}
