//! pokefacade - look up Pokémon species descriptions
//!
//! Fetches species data, optionally runs the description through a fun
//! translation, and prints one JSON object per requested name.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use futures::future::join_all;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pokefacade::cache::{CacheFacade, CacheStore, FileStore, MemoryStore, RedisStore};
use pokefacade::cli::{AppConfig, CacheBackend, Cli};
use pokefacade::data::{
    HttpTransport, ReqwestTransport, SpeciesLookupService, TranslationLookupService,
};
use pokefacade::Pokedex;

/// Key namespace used in a shared Redis
const REDIS_KEY_PREFIX: &str = "pokefacade:";

/// Sets up logging to stderr, filtered by `RUST_LOG`
fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "pokefacade=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Opens the configured cache store
///
/// Falls back to an in-memory store if the configured one cannot be set up,
/// so lookups still work without a cache.
fn open_store(config: &AppConfig) -> Arc<dyn CacheStore> {
    match config.cache {
        CacheBackend::Memory => Arc::new(MemoryStore::new()),
        CacheBackend::File => match FileStore::new() {
            Some(store) => {
                info!(dir = %store.dir().display(), "using file cache");
                Arc::new(store)
            }
            None => {
                warn!("no cache directory available, using in-memory cache");
                Arc::new(MemoryStore::new())
            }
        },
        CacheBackend::Redis => match RedisStore::open(&config.redis_url) {
            Ok(store) => Arc::new(store.with_key_prefix(REDIS_KEY_PREFIX)),
            Err(error) => {
                warn!(%error, "invalid redis configuration, using in-memory cache");
                Arc::new(MemoryStore::new())
            }
        },
    }
}

fn build_pokedex(config: &AppConfig) -> Result<Pokedex, Box<dyn std::error::Error>> {
    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(config.timeout)?);
    let cache = CacheFacade::new(open_store(config));

    let species = SpeciesLookupService::new(
        Arc::clone(&transport),
        cache.clone(),
        config.species_base_url.clone(),
    )?;
    let translation =
        TranslationLookupService::new(transport, cache, config.translation_base_url.clone())?;
    Ok(Pokedex::new(species, translation))
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    let config = match AppConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(ExitCode::from(2));
        }
    };

    let pokedex = build_pokedex(&config)?;

    // Each name runs as its own pipeline; output order follows the arguments
    let results = join_all(
        config
            .names
            .iter()
            .map(|name| pokedex.describe(name, config.translate)),
    )
    .await;

    let mut exit = ExitCode::SUCCESS;
    for (name, result) in config.names.iter().zip(results) {
        match result {
            Ok(description) => println!("{}", serde_json::to_string(&description)?),
            Err(e) => {
                eprintln!("Error looking up '{}': {}", name, e);
                exit = ExitCode::FAILURE;
            }
        }
    }

    Ok(exit)
}
