//! Group listing and per-group repository collection

use super::types::CreateRepositoryRequest;
use crate::{ApiError, AppState};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use gitshelf_core::Repository;
use tracing::info;

/// `GET /api/groups`
pub async fn list_groups(State(state): State<AppState>) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(state.engine.list_groups().await?))
}

/// `GET /api/groups/{group}/repositories`
pub async fn list_repositories(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Result<Json<Vec<Repository>>, ApiError> {
    Ok(Json(state.engine.list_repositories(&group).await?))
}

/// `POST /api/groups/{group}/repositories` with `{"name": ...}`
pub async fn create_repository(
    State(state): State<AppState>,
    Path(group): Path<String>,
    body: Result<Json<CreateRepositoryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Repository>), ApiError> {
    let Json(request) = body?;
    let repository = state
        .engine
        .create_repository(&group, request.name.trim())
        .await?;

    info!(group = %group, name = %repository.name, "created via API");
    Ok((StatusCode::CREATED, Json(repository)))
}
