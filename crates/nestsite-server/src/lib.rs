//! NestSite HTTP server: management API, public site resolution and the
//! local media store, wired over SurrealDB.

pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use std::io;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tracing::{info, warn};

pub use config::ServerConfig;
pub use routes::router;
pub use state::{AppState, StartupError};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error("cannot bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

/// Build the application state and serve until SIGINT or SIGTERM.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    let addr = config.bind_addr.clone();
    let state = AppState::new(config).await?;

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!(addr = %addr, "Listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                warn!(error = %e, "Failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
