mod config;
mod middleware;
mod routes;
mod sweeper;
mod transport;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use aurabot_db::Database;
use aurabot_engine::Engine;

use crate::config::Config;
use crate::routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "aurabot=debug,aurabot_engine=debug,aurabot_db=info,tower_http=debug".into()
            }),
        )
        .init();

    // Config
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("FATAL: {:#}", e);
            eprintln!("       Set it in your .env file and restart.");
            std::process::exit(1);
        }
    };

    // Init database and engine
    let db = Database::open(&config.db_path)?;
    let engine = Arc::new(Engine::new(db, config.engine.clone()));

    // Background duel expiry
    if config.engine.duel_ttl.is_some() {
        tokio::spawn(sweeper::run_sweep_loop(engine.clone(), config.sweep_interval_secs));
    }

    let state = AppState {
        engine,
        bot_username: config.bot_username.as_deref().map(Arc::from),
    };
    let app = routes::router(state, &config.webhook_secret);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Aura bot webhook listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
