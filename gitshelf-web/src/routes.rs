//! Route definitions for the gitshelf web server

use crate::{handlers, AppState};
use axum::{
    routing::get,
    Router,
};

/// Create API routes
///
/// Repository, directory and file handlers read the raw request path, so the
/// wildcard captures are declared but never extracted.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Groups
        .route("/groups", get(handlers::list_groups))
        .route(
            "/groups/{group}/repositories",
            get(handlers::list_repositories).post(handlers::create_repository),
        )
        // Single repository
        .route(
            "/repository/{*path}",
            get(handlers::get_repository)
                .delete(handlers::delete_repository)
                .post(handlers::repository_operation),
        )
        // Browsing
        .route("/directory/{*path}", get(handlers::list_directory))
        .route("/file/{*path}", get(handlers::read_file))
}
