//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! It configures and starts the HTTP server with all necessary routes.

use actix_web::{
    App, HttpServer,
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    middleware::{Compress, DefaultHeaders, NormalizePath, TrailingSlash},
    web,
};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::middleware::TimingMiddleware;
use crate::api::services::configure_routes;
use crate::api::state::AppState;
use crate::config::StaticConfig;

/// The application with its middleware stack and routes, shared by the
/// server workers and the integration tests.
pub fn build_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(TimingMiddleware) // 最外层，记录请求延迟
        .wrap(NormalizePath::new(TrailingSlash::Trim))
        .wrap(Compress::default())
        .wrap(
            DefaultHeaders::new()
                .add(("Connection", "keep-alive"))
                .add(("Keep-Alive", "timeout=30, max=1000"))
                .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
        )
        .app_data(state)
        .configure(configure_routes)
}

/// Run the HTTP server
///
/// This function:
/// 1. Loads the published table and prepares the download cache
/// 2. Configures and starts the HTTP server
/// 3. Listens for ctrl-c
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: &StaticConfig) -> Result<()> {
    std::fs::create_dir_all(&config.data.cache_dir)
        .with_context(|| format!("Failed to create cache dir {}", config.data.cache_dir))?;

    let state = web::Data::new(AppState::from_config(config));
    {
        let snapshot = state.data.snapshot();
        match &snapshot.error {
            Some(e) => warn!("Serving without data: {}", e),
            None => info!(
                "Loaded {} courses from {}",
                snapshot.rows.len(),
                config.data.published_file
            ),
        }
    }

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let server = HttpServer::new(move || build_app(state.clone()))
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Server binding failed on {}", bind_address))?
        .run();
    let handle = server.handle();

    // Wait for server or shutdown signal
    tokio::select! {
        res = server => {
            res?;
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Received shutdown signal, stopping server");
            handle.stop(true).await;
        }
    }

    Ok(())
}
