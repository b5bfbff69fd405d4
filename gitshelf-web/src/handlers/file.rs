//! File contents

use super::raw_tail;
use super::types::FileResponse;
use crate::{ApiError, AppState};
use axum::{
    extract::{OriginalUri, State},
    response::Json,
};
use gitshelf_repo::path_codec;

const PREFIX: &str = "/api/file/";

/// `GET /api/file/{group}/{name}/{path}`
pub async fn read_file(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
) -> Result<Json<FileResponse>, ApiError> {
    let target = path_codec::decode_file(raw_tail(&uri, PREFIX))?;
    let blob = state
        .engine
        .read_file(&target.group, &target.name, &target.remainder)
        .await?;
    Ok(Json(blob.into()))
}
