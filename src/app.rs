//! Application struct that encapsulates server assembly and serving logic.

use quill_core::config::Settings;
use quill_core::lifecycle::signal::SignalHandler;
use quill_server::{AppState, build_router};
use std::net::SocketAddr;

pub struct Application {
    app_router: axum::Router,
    addr: String,
}

impl Application {
    /// Build the router and resolve the listen address from settings.
    pub fn build(settings: Settings) -> Self {
        let addr = format!("{}:{}", settings.host, settings.port);

        tracing::info!(
            app = %settings.app_name,
            version = %settings.app_version,
            database_configured = settings.database_url.is_some(),
            readiness_timeout_ms = settings.readiness_timeout_ms,
            hsts = settings.enable_hsts,
            "Configuration loaded"
        );

        let app_router = build_router(AppState::new(settings));
        Self { app_router, addr }
    }

    /// Serve HTTP until SIGINT/SIGTERM, then drain gracefully.
    pub async fn serve(self) -> anyhow::Result<()> {
        let Self { app_router, addr } = self;

        let (signal_handler, mut shutdown_rx) = SignalHandler::new();
        tokio::spawn(signal_handler.run());

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!(address = %listener.local_addr()?, "Listening for connections");

        let shutdown = async move {
            let _ = shutdown_rx.wait_for(|v| *v).await;
        };

        axum::serve(
            listener,
            app_router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;

        tracing::info!("Server shut down.");
        Ok(())
    }
}
