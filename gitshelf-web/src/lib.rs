//! gitshelf web server
//!
//! JSON API over the repository engine: group and repository listings,
//! tree and file browsing, repository creation and deletion.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

// Re-export main types
pub use error::ApiError;
pub use server::GitshelfServer;
pub use state::AppState;

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        Method,
    },
    Router,
};
use gitshelf_core::{ShelfConfig, ShelfError};
use std::path::PathBuf;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([ACCEPT, CONTENT_TYPE]);

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// TOML file with the store configuration
    pub config_file: Option<PathBuf>,
    /// Log level for the gitshelf crates
    pub log_level: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            config_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("GITSHELF_WEB_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("GITSHELF_WEB_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            config_file: std::env::var("GITSHELF_CONFIG").ok().map(PathBuf::from),
            log_level: std::env::var("GITSHELF_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Store configuration: the config file when given, otherwise defaults,
    /// then `GITSHELF_*` environment overrides
    pub fn shelf_config(&self) -> WebResult<ShelfConfig> {
        let base = match &self.config_file {
            Some(path) => ShelfConfig::from_file(path)?,
            None => ShelfConfig::default(),
        };
        let config = base.with_env_overrides();
        config.validate()?;
        Ok(config)
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ShelfError),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;
