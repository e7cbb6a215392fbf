use crate::IndexingStatus;
use serde::Serialize;
use std::{io, path::Path};

/// Extensions accepted by the `file_search` tool that this tool offers for
/// upload.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "pdf", "txt", "md", "json", "docx", "pptx", "html", "py", "java", "js", "ts",
];

#[must_use]
pub fn is_supported(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(extension))
        })
}

/// A file waiting to be uploaded to the knowledge base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} has no usable file name", path.display()),
                )
            })?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self { filename, bytes })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    pub filename: String,
    pub file_id: String,
    pub status: IndexingStatus,
}
