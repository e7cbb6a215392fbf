use crate::{Backend, FinderError, FinderResult};
use bbp_sdk::{
    openai::{FilePurpose, FileUpload, VectorStore, VectorStoreCreateParams},
    ServiceError,
};
use serde::Serialize;
use std::{fmt, sync::Arc};
use tracing::{debug, info, warn};

pub const UNKNOWN_FILENAME: &str = "(unknown)";

/// A remote document collection (an `OpenAI` vector store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Collection {
    pub id: String,
    pub name: Option<String>,
}

impl From<VectorStore> for Collection {
    fn from(store: VectorStore) -> Self {
        Self {
            id: store.id,
            name: store.name,
        }
    }
}

/// Indexing state of a file attached to a collection. The raw remote value
/// is kept for everything but plain success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "raw", rename_all = "snake_case")]
pub enum FileStatus {
    Pending(String),
    Completed,
    Failed(String),
    Unknown(String),
}

impl FileStatus {
    #[must_use]
    pub fn from_remote(status: &str) -> Self {
        match status {
            "completed" | "finished" => Self::Completed,
            "failed" | "error" => Self::Failed(status.to_string()),
            "in_progress" | "pending" | "queued" => Self::Pending(status.to_string()),
            other => Self::Unknown(other.to_string()),
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed(_))
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::Unknown(raw) if raw.is_empty() => f.write_str("unknown"),
            Self::Pending(raw) | Self::Failed(raw) | Self::Unknown(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub file_id: String,
    pub filename: String,
    pub status: FileStatus,
}

/// One item of a batch operation that did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub item: String,
    pub error: String,
}

/// Outcome of deleting a collection together with its files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeDeleteReport {
    pub collection_id: String,
    /// IDs of the file objects that were deleted.
    pub succeeded: Vec<String>,
    pub failed: Vec<ItemFailure>,
    /// Set when the attached files could not be enumerated; the collection
    /// itself was still deleted.
    pub listing_error: Option<String>,
}

impl CascadeDeleteReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.listing_error.is_none()
    }
}

/// Pass-through client for collections and their files.
#[derive(Clone)]
pub struct IndexClient {
    backend: Arc<dyn Backend>,
}

impl IndexClient {
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub async fn create_collection(&self, name: &str) -> FinderResult<Collection> {
        let store = self
            .backend
            .create_vector_store(VectorStoreCreateParams {
                name: Some(name.to_string()),
                ..Default::default()
            })
            .await?;
        info!(collection_id = %store.id, name, "created vector store");
        Ok(store.into())
    }

    /// List collections from a single remote call. A "not found" answer right
    /// after a deletion is the service settling, so it is retried once.
    pub async fn list_collections(&self) -> FinderResult<impl Iterator<Item = Collection>> {
        let stores = match self.backend.list_vector_stores().await {
            Err(error) if error.is_not_found() => {
                info!(%error, "vector store listing not settled, refreshing once");
                self.backend.list_vector_stores().await?
            }
            result => result?,
        };
        Ok(stores.into_iter().map(Collection::from))
    }

    /// Detach and delete every attached file, then delete the collection.
    /// Per-file failures are collected in the report; only a failure of the
    /// final collection deletion is an error.
    pub async fn delete_collection(&self, collection_id: &str) -> FinderResult<CascadeDeleteReport> {
        let mut report = CascadeDeleteReport {
            collection_id: collection_id.to_string(),
            succeeded: Vec::new(),
            failed: Vec::new(),
            listing_error: None,
        };

        let files = match self.backend.list_vector_store_files(collection_id).await {
            Ok(files) => files,
            Err(error) => {
                warn!(collection_id, %error, "could not list files before deletion");
                report.listing_error = Some(error.to_string());
                Vec::new()
            }
        };

        for file in files {
            if let Err(error) = self
                .backend
                .delete_vector_store_file(collection_id, &file.id)
                .await
            {
                debug!(collection_id, file_id = %file.id, %error, "detach failed");
            }

            match self.backend.delete_file(&file.id).await {
                Ok(_) => report.succeeded.push(file.id),
                Err(error) => {
                    warn!(collection_id, file_id = %file.id, %error, "failed to delete file");
                    report.failed.push(ItemFailure {
                        item: file.id,
                        error: error.to_string(),
                    });
                }
            }
        }

        self.backend
            .delete_vector_store(collection_id)
            .await
            .map_err(|error| store_error(collection_id, error))?;

        info!(
            collection_id,
            deleted_files = report.succeeded.len(),
            failed_files = report.failed.len(),
            "deleted vector store"
        );
        Ok(report)
    }

    /// Upload raw bytes as a new file object, then attach it to the
    /// collection. If attaching fails the uploaded file is left behind.
    pub async fn attach_file(
        &self,
        collection_id: &str,
        bytes: Vec<u8>,
        filename: &str,
    ) -> FinderResult<String> {
        let file = self
            .backend
            .create_file(FileUpload {
                filename: filename.to_string(),
                bytes,
                purpose: FilePurpose::Assistants,
            })
            .await?;
        debug!(file_id = %file.id, filename, "uploaded file");

        self.backend
            .create_vector_store_file(collection_id, &file.id)
            .await
            .map_err(|error| {
                warn!(
                    collection_id,
                    file_id = %file.id,
                    "attach failed, uploaded file is orphaned"
                );
                store_error(collection_id, error)
            })?;
        info!(collection_id, file_id = %file.id, filename, "attached file");
        Ok(file.id)
    }

    /// Remove a file from retrieval scope. The file object is kept.
    pub async fn detach_file(&self, collection_id: &str, file_id: &str) -> FinderResult<()> {
        self.backend
            .delete_vector_store_file(collection_id, file_id)
            .await?;
        info!(collection_id, file_id, "detached file");
        Ok(())
    }

    pub async fn delete_file(&self, file_id: &str) -> FinderResult<()> {
        self.backend.delete_file(file_id).await?;
        info!(file_id, "deleted file");
        Ok(())
    }

    /// Files of a collection with their filenames resolved one by one.
    /// Filenames that cannot be resolved read `(unknown)`.
    pub async fn list_files(&self, collection_id: &str) -> FinderResult<Vec<FileEntry>> {
        let files = self
            .backend
            .list_vector_store_files(collection_id)
            .await
            .map_err(|error| store_error(collection_id, error))?;

        let mut entries = Vec::with_capacity(files.len());
        for file in files {
            let filename = match self.backend.retrieve_file(&file.id).await {
                Ok(object) if !object.filename.is_empty() => object.filename,
                Ok(_) => UNKNOWN_FILENAME.to_string(),
                Err(error) => {
                    debug!(file_id = %file.id, %error, "could not resolve filename");
                    UNKNOWN_FILENAME.to_string()
                }
            };
            entries.push(FileEntry {
                status: FileStatus::from_remote(&file.status),
                file_id: file.id,
                filename,
            });
        }
        Ok(entries)
    }

    /// Current status of one file, or `None` when the collection does not
    /// list it (yet).
    pub async fn file_status(
        &self,
        collection_id: &str,
        file_id: &str,
    ) -> FinderResult<Option<FileStatus>> {
        let files = self.backend.list_vector_store_files(collection_id).await?;
        Ok(files
            .into_iter()
            .find(|file| file.id == file_id)
            .map(|file| FileStatus::from_remote(&file.status)))
    }
}

fn store_error(collection_id: &str, error: ServiceError) -> FinderError {
    if error.is_not_found() && error.to_string().contains(collection_id) {
        FinderError::StoreNotFound(collection_id.to_string())
    } else {
        FinderError::Remote(error)
    }
}
