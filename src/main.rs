mod config;
mod db;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::routes::antiforgery::Antiforgery;
use crate::routes::todos::queries::PgTodoStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("todos=info,tower_http=info")),
        )
        .compact()
        .init();

    let pool = db::create_pool(&config.database_url, config.max_connections).await?;
    db::MIGRATOR.run(&pool).await?;

    let state = state::AppState::new(
        Arc::new(PgTodoStore::new(pool)),
        Antiforgery::new(&config.antiforgery_secret, config.antiforgery_ttl_minutes),
    );

    let app = routes::app(state);

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;

    info!("server is listening on http://{}", config.addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("received Ctrl+C, shutting down"),
        _ = terminate => warn!("received SIGTERM, shutting down"),
    }
}
