//! gitshelf web server
//!
//! Binds the API router to a TCP listener.

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main gitshelf web server
pub struct GitshelfServer {
    config: WebConfig,
    state: AppState,
}

impl GitshelfServer {
    /// Create a new server; fails when the store configuration is invalid
    pub fn new(config: WebConfig) -> WebResult<Self> {
        let state = AppState::new(config.shelf_config()?)?;
        Ok(Self { config, state })
    }

    /// Serve until interrupted
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();
        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        if let Err(e) = serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        info!("Server shut down");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

/// Builder for GitshelfServer
pub struct GitshelfServerBuilder {
    config: WebConfig,
}

impl Default for GitshelfServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GitshelfServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: WebConfig::default(),
        }
    }

    /// Start from an existing configuration
    pub fn with_config(config: WebConfig) -> Self {
        Self { config }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the store configuration file
    pub fn config_file<P: Into<std::path::PathBuf>>(mut self, path: P) -> Self {
        self.config.config_file = Some(path.into());
        self
    }

    /// Build the server
    pub fn build(self) -> WebResult<GitshelfServer> {
        GitshelfServer::new(self.config)
    }
}
