//! Request and response bodies

use chrono::{DateTime, Utc};
use gitshelf_core::BlobResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateRepositoryRequest {
    pub name: String,
}

/// Body of `POST /api/repository/...`
#[derive(Debug, Deserialize)]
pub struct RepositoryOperationRequest {
    pub operation: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub const BINARY_FILE_MESSAGE: &str = "Binary file cannot be displayed";

/// File contents, with an explanation attached when they are withheld
#[derive(Debug, Serialize)]
pub struct FileResponse {
    #[serde(flatten)]
    pub blob: BlobResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<BlobResult> for FileResponse {
    fn from(blob: BlobResult) -> Self {
        let message = blob.is_binary.then(|| BINARY_FILE_MESSAGE.to_string());
        Self { blob, message }
    }
}
