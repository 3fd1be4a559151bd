use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

use minifeed::auth::tokens::{load_or_create_secret, TokenSigner};
use minifeed::config::{Cli, Config};
use minifeed::state::AppState;
use minifeed::{app, db};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let data_dir = Config::data_dir(&cli);
    std::fs::create_dir_all(&data_dir)?;
    tracing::info!("Data directory: {}", data_dir.display());

    let config = Config::load(&cli)?;

    // Initialize database
    let pool = db::create_pool(config.db_path())?;
    db::run_migrations(&pool)?;

    // Bearer credential signer
    let secret = load_or_create_secret(config.auth.token_secret.as_deref(), &data_dir)?;
    let signer = TokenSigner::new(&secret, config.auth.token_hours);

    let state = AppState {
        db: pool,
        config: config.clone(),
        signer,
    };

    let app = app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
