#![allow(clippy::pedantic)]
use serde::{Deserialize, Serialize};

// https://platform.openai.com/docs/api-reference/vector-stores

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct VectorStoreCreateParams {
    /// The name of the vector store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// A list of File IDs that the vector store should use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_ids: Option<Vec<String>>,
}

/// A vector store is a collection of processed files that can be used by the
/// `file_search` tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VectorStore {
    /// The identifier, which can be referenced in API endpoints.
    pub id: String,

    /// The name of the vector store.
    #[serde(default)]
    pub name: Option<String>,

    /// The Unix timestamp (in seconds) for when the vector store was created.
    #[serde(default)]
    pub created_at: i64,

    /// The status of the vector store, which can be either `expired`,
    /// `in_progress`, or `completed`.
    #[serde(default)]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_counts: Option<VectorStoreFileCounts>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct VectorStoreFileCounts {
    pub cancelled: u32,
    pub completed: u32,
    pub failed: u32,
    pub in_progress: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VectorStoreFileCreateParams {
    /// A File ID that the vector store should use.
    pub file_id: String,
}

/// A file attached to a vector store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VectorStoreFile {
    /// The identifier, which is the same as the underlying File ID.
    pub id: String,

    /// The ID of the vector store that the file is attached to.
    #[serde(default)]
    pub vector_store_id: String,

    /// The status of the vector store file, which can be either
    /// `in_progress`, `completed`, `cancelled`, or `failed`. The status
    /// `completed` indicates that the vector store file is ready for use.
    #[serde(default)]
    pub status: String,

    /// The last error associated with this vector store file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<VectorStoreFileError>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VectorStoreFileError {
    /// One of `server_error`, `unsupported_file` or `invalid_file`.
    pub code: String,

    /// A human-readable description of the error.
    pub message: String,
}

/// A single page of a cursor-paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListPage<T> {
    pub data: Vec<T>,

    #[serde(default)]
    pub has_more: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeletionStatus {
    pub id: String,
    pub deleted: bool,
}
