use std::sync::Arc;

use anyhow::Context;
use axum::{extract::Request, ServiceExt};

use farmstand_api::{app, config::Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    farmstand_observability::init();

    let settings = Settings::from_env()?;
    let services = Arc::new(
        app::services::build_services(&settings)
            .await
            .with_context(|| format!("failed to start {} product store", settings.store.as_str()))?,
    );

    let app = app::build_app(services.clone());

    let listener = tokio::net::TcpListener::bind(settings.addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        store = settings.store.as_str(),
        "listening"
    );

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    services.shutdown().await;
    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {e}");
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

    tracing::info!("shutdown signal received");
}
