use std::path::PathBuf;

use axum_extra::extract::cookie::Key;
use clap::Parser;
use diesel::{
    SqliteConnection,
    r2d2::{ConnectionManager, Pool},
};
use diesel_migrations::MigrationHarness;
use matchday::{
    MIGRATIONS,
    config::{AppConfig, create_app},
    state::{AppState, DbPool},
    storage::ObjectStore,
};
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[clap(about = "Match and summary management for the club")]
struct Args {
    /// Path to a TOML configuration file.
    #[clap(long, short)]
    config: Option<PathBuf>,
}

fn session_key(config: &AppConfig) -> Result<Key, BoxError> {
    match &config.secret_key {
        Some(secret) => Ok(Key::try_from(secret.as_bytes())
            .map_err(|e| format!("SECRET_KEY is not usable: {e}"))?),
        None => {
            tracing::warn!(
                "no secret key configured; sessions will not survive a restart"
            );
            Ok(Key::generate())
        }
    }
}

async fn run(config: AppConfig) -> Result<(), BoxError> {
    tracing::info!(database_url = %config.database_url, "opening database");

    let pool: DbPool = Pool::builder()
        .max_size(if config.database_url == ":memory:" { 1 } else { 10 })
        .build(ConnectionManager::<SqliteConnection>::new(&config.database_url))?;

    {
        let pool = pool.clone();
        tokio::task::spawn_blocking(move || -> Result<(), BoxError> {
            let mut conn = pool.get()?;
            conn.run_pending_migrations(MIGRATIONS)?;
            Ok(())
        })
        .await??;
    }

    tokio::fs::create_dir_all(&config.assets_dir).await?;

    let state = AppState {
        pool,
        key: session_key(&config)?,
        store: ObjectStore::new(config.assets_dir.clone()),
    };

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, create_app(state)).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,matchday=debug")),
        )
        .init();

    let args = Args::parse();
    let config = AppConfig::load(args.config.as_deref())?;

    run(config).await
}
