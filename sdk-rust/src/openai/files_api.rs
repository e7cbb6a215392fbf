#![allow(clippy::pedantic)]
use serde::{Deserialize, Serialize};

// https://platform.openai.com/docs/api-reference/files

/// The intended purpose of an uploaded file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FilePurpose {
    /// Used in the Assistants API and by the `file_search` tool.
    #[default]
    Assistants,
    UserData,
}

impl FilePurpose {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Assistants => "assistants",
            Self::UserData => "user_data",
        }
    }
}

/// Raw bytes to upload to the Files API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub purpose: FilePurpose,
}

/// The `File` object represents a document that has been uploaded to `OpenAI`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileObject {
    /// The file identifier, which can be referenced in the API endpoints.
    pub id: String,

    /// The size of the file, in bytes.
    #[serde(default)]
    pub bytes: u64,

    /// The Unix timestamp (in seconds) for when the file was created.
    #[serde(default)]
    pub created_at: i64,

    /// The name of the file.
    #[serde(default)]
    pub filename: String,

    /// The intended purpose of the file.
    #[serde(default)]
    pub purpose: String,
}
