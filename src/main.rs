use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use projects_api::cache::{MemoryResponseCache, NoCache, ResponseCache};
use projects_api::config;
use projects_api::controller::ProjectsController;
use projects_api::database::{DatabaseManager, MemoryProjectStore, PgProjectStore, ProjectStore};
use projects_api::middleware::AuthSettings;
use projects_api::policy::AccessPolicy;
use projects_api::routes::{app, AppState, RouterOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    /// Postgres when DATABASE_URL is set, memory otherwise
    Auto,
    Memory,
    Postgres,
}

#[derive(Parser)]
#[command(name = "projects-api")]
#[command(about = "Permission-checked Project resource service")]
#[command(version)]
struct Cli {
    #[arg(long, env = "PROJECTS_API_PORT", help = "Port to listen on (overrides SERVER_PORT)")]
    port: Option<u16>,

    #[arg(long, value_enum, default_value_t = StoreKind::Auto, help = "Storage backend")]
    store: StoreKind,

    #[arg(long, help = "Disable the index response cache")]
    no_cache: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,projects_api=debug")),
        )
        .init();

    let cli = Cli::parse();
    let config = config::config();
    tracing::info!("Starting projects-api in {:?} mode", config.environment);

    anyhow::ensure!(
        !config.security.jwt_secret.is_empty(),
        "SECURITY_JWT_SECRET must be set outside development"
    );

    let use_postgres = match cli.store {
        StoreKind::Auto => config.database.url.is_some(),
        StoreKind::Memory => false,
        StoreKind::Postgres => true,
    };

    let (store, pool) = if use_postgres {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("failed to connect to database")?;
        let store = PgProjectStore::new(pool.clone());
        store.ensure_schema().await.context("failed to prepare projects table")?;
        let store: Arc<dyn ProjectStore> = Arc::new(store);
        (store, Some(pool))
    } else {
        if !projects_api::is_development!() {
            tracing::warn!("Running on the in-memory store; data is lost on restart");
        }
        let store: Arc<dyn ProjectStore> = Arc::new(MemoryProjectStore::new());
        (store, None)
    };

    let cache: Arc<dyn ResponseCache> = if config.cache.enable_action_cache && !cli.no_cache {
        Arc::new(MemoryResponseCache::new(Duration::from_secs(config.cache.ttl_secs)))
    } else {
        Arc::new(NoCache)
    };

    let controller = ProjectsController::new(store, Arc::new(AccessPolicy), cache);
    let mut state = AppState::new(controller);
    if let Some(pool) = pool {
        state = state.with_pool(pool);
    }

    let auth = AuthSettings::new(config.security.jwt_secret.as_str());
    let router = app(state, auth, RouterOptions::from_config(config));

    let port = cli.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", config.server.host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("projects-api listening on http://{}", bind_addr);

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
