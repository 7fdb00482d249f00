//! campus-web - faculty management web service
//!
//! Serves the department and publication pages, their JSON API, and DOI /
//! citation lookups against Crossref and the other bibliographic sources.

use anyhow::{Context, Result};
use campus_common::config::{CliArgs, ServerConfig};
use campus_common::db::{connect, init_schema};
use campus_web::services::DoiService;
use campus_web::{build_router, AppState};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CliArgs::parse();

    // CAMPUS_LOG (via --log-level), then RUST_LOG, then info
    let initial_filter = match cli.log_level.as_deref() {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let (filter, filter_handle) = reload::Layer::new(initial_filter);
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting campus-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let config = ServerConfig::resolve(&cli).context("Failed to load configuration")?;

    // A level from the config file applies only when nothing more specific was given
    if cli.log_level.is_none() && std::env::var_os("RUST_LOG").is_none() {
        if let Err(e) = filter_handle.reload(EnvFilter::new(&config.logging.level)) {
            warn!("Could not apply configured log level: {}", e);
        }
    }

    let pool = match connect(&config.database).await {
        Ok(pool) => pool,
        Err(e) => {
            error!(
                host = %config.database.host,
                port = config.database.port,
                database = %config.database.database,
                "Failed to connect to database: {}",
                e
            );
            return Err(e.into());
        }
    };

    init_schema(&pool)
        .await
        .context("Failed to initialize database schema")?;

    let doi = DoiService::from_config(&config.sources)
        .context("Failed to build bibliographic API clients")?;

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(pool, doi, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("campus-web listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
