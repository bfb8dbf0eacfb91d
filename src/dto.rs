use serde::Serialize;

/// Body of every successful mutation.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Creation result, carrying the store-assigned id.
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub id: i32,
}
