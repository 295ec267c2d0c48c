use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use bookshelf::{config::Config, connection::StoreConnection, create_app, logging};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let config = Config::parse();

    let settings = config.store_settings();
    tracing::info!(store = settings.kind(), "Using document store");

    let connection = Arc::new(StoreConnection::new(settings));
    let app = create_app(Arc::clone(&connection)).context("failed to load page templates")?;

    let addr = SocketAddr::new(config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("Server running at http://{}:{}/", config.hostname, config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    connection
        .close()
        .await
        .context("failed to close the document store")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                ctrl_c.await.ok();
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
    }

    tracing::info!("Shutting down");
}
