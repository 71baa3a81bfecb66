mod auth;
mod baas;
mod config;
mod content;
mod errors;
mod generation;
mod models;
mod routes;
mod spaces;
mod state;
#[cfg(test)]
mod test_util;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting proSpace API v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Generation service: {} (timeout {}s)",
        config.generation_api_url, config.generation_timeout_secs
    );
    info!(
        "BaaS: {} project={} database={}",
        config.baas_endpoint, config.baas_project_id, config.baas_database_id
    );
    if config.baas_api_key.is_none() {
        info!("BAAS_API_KEY not set; login will not receive session secrets");
    }

    let port = config.port;
    let state = AppState::from_config(config);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
