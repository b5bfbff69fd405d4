//! Directory listings

use super::raw_tail;
use crate::{ApiError, AppState};
use axum::{
    extract::{OriginalUri, State},
    response::Json,
};
use gitshelf_core::TreeEntry;
use gitshelf_repo::path_codec;

const PREFIX: &str = "/api/directory/";

/// `GET /api/directory/{group}/{name}[/{path}]`
pub async fn list_directory(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<Vec<TreeEntry>>, ApiError> {
    let target = path_codec::decode_directory(raw_tail(&uri, PREFIX))?;
    let entries = state
        .engine
        .list_directory(&target.group, &target.name, &target.remainder)
        .await?;
    Ok(Json(entries))
}
