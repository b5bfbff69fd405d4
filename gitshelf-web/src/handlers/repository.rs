//! Single-repository endpoints addressed by an encoded `group/name` tail

use super::raw_tail;
use super::types::{MessageResponse, RepositoryOperationRequest};
use crate::{ApiError, AppState};
use axum::{
    extract::{rejection::JsonRejection, OriginalUri, State},
    response::Json,
};
use gitshelf_core::RepositoryDetails;
use gitshelf_repo::path_codec;

const PREFIX: &str = "/api/repository/";

/// `GET /api/repository/{group}/{name}`
pub async fn get_repository(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<RepositoryDetails>, ApiError> {
    let (group, name) = path_codec::decode_repository(raw_tail(&uri, PREFIX))?;
    Ok(Json(state.engine.get_repository_details(&group, &name).await?))
}

/// `DELETE /api/repository/{group}/{name}`
pub async fn delete_repository(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<MessageResponse>, ApiError> {
    let (group, name) = path_codec::decode_repository(raw_tail(&uri, PREFIX))?;
    state.engine.delete_repository(&group, &name).await?;
    Ok(Json(MessageResponse::new("Repository deleted")))
}

/// `POST /api/repository/{group}/{name}` with `{"operation": "delete"}`
pub async fn repository_operation(
    state: State<AppState>,
    uri: OriginalUri,
    body: Result<Json<RepositoryOperationRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = body?;
    match request.operation.as_str() {
        "delete" => delete_repository(state, uri).await,
        other => Err(ApiError::BadRequest(format!(
            "Unsupported operation '{}'",
            other
        ))),
    }
}
