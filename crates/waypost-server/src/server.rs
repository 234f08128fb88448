use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};

use waypost_core::{AddressStore, Config, StoreError};

use crate::routes::router;
use crate::state::AppState;

/// Open the store, bind, and serve until Ctrl+C or SIGTERM
pub async fn run(config: Config) -> Result<()> {
    info!(backend = %config.backend, "Opening address store...");
    let store = match AddressStore::open_with_config(&config) {
        Ok(store) => store,
        Err(e) => {
            if let StoreError::Storage(ref storage) = e {
                if let Some(hint) = storage.recovery_suggestion() {
                    error!("{hint}");
                }
            }
            return Err(e).context("Failed to open address store");
        }
    };
    let state = AppState::new(store);

    let app = router(state);

    let address = config.bind_address();
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {e}");
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
