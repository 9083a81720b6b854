//! API Server
//!
//! Wires the game service into an axum app and serves it until Ctrl+C or
//! SIGTERM.

use super::{
    handlers::AppState,
    middleware::{create_cors_layer, request_id_middleware},
    routes::create_router,
};
use crate::config::ApiConfig;
use crate::service::GameService;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::{info, warn};

pub struct ApiServer {
    config: ApiConfig,
    service: Arc<GameService>,
}

impl ApiServer {
    pub fn new(config: ApiConfig, service: Arc<GameService>) -> Self {
        Self { config, service }
    }

    /// Serve until a shutdown signal arrives. The idle-round reaper runs for
    /// the lifetime of the server.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.create_app();
        let addr = self.get_socket_addr()?;

        let reaper = self.service.spawn_reaper();

        info!("Starting fairplay API server");
        info!("   Listen: http://{}", addr);
        info!("   CORS: {:?}", self.config.allowed_origins);
        info!("   Request timeout: {}s", self.config.request_timeout_secs);

        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        reaper.abort();
        info!("API server stopped gracefully");
        Ok(())
    }

    /// The full application with middleware stack
    pub fn create_app(&self) -> axum::Router {
        build_app(self.service.clone(), &self.config)
    }

    fn get_socket_addr(&self) -> Result<SocketAddr, Box<dyn std::error::Error>> {
        Ok(SocketAddr::from((
            self.config.host.parse::<std::net::IpAddr>()?,
            self.config.port,
        )))
    }
}

/// Router plus middleware, usable without binding a socket.
pub fn build_app(service: Arc<GameService>, config: &ApiConfig) -> axum::Router {
    let state = Arc::new(AppState {
        service,
        version: env!("CARGO_PKG_VERSION").to_string(),
    });

    create_router(state)
        .layer(create_cors_layer(config.allowed_origins.clone()))
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(TraceLayer::new_for_http())
        // Outermost, so timeouts and preflights carry the id too
        .layer(axum::middleware::from_fn(request_id_middleware))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
