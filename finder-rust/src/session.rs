use crate::{
    extract, query, upload, wait_until_indexed, Backend, CascadeDeleteReport, Collection,
    Connector, Extraction, FileEntry, FinderError, FinderResult, IndexClient, ItemFailure,
    PollOptions, SessionConfig, UploadFile, UploadedFile,
};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Per-file results of an upload batch.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct UploadReport {
    pub succeeded: Vec<UploadedFile>,
    pub failed: Vec<ItemFailure>,
}

/// A backend together with the credential and endpoint it was built for.
struct Connection {
    api_key: String,
    base_url: Option<String>,
    backend: Arc<dyn Backend>,
}

impl Connection {
    fn serves(&self, config: &SessionConfig) -> bool {
        self.api_key == config.api_key() && self.base_url.as_deref() == config.base_url()
    }
}

/// One user's session: its configuration plus the actions a user can take.
/// Each action runs to completion before returning and turns nothing into a
/// panic; failures come back as [`FinderError`].
pub struct Session {
    config: SessionConfig,
    connector: Box<dyn Connector>,
    connection: Mutex<Option<Connection>>,
    upload_poll: PollOptions,
}

impl Session {
    pub fn new(config: SessionConfig, connector: impl Connector + 'static) -> Self {
        Self {
            config,
            connector: Box::new(connector),
            connection: Mutex::new(None),
            upload_poll: PollOptions::UPLOAD,
        }
    }

    #[must_use]
    pub fn with_upload_poll(mut self, options: PollOptions) -> Self {
        self.upload_poll = options;
        self
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    pub fn set_active_store(&mut self, store_id: &str) {
        self.config.set_active_store(store_id);
        info!(store_id, "active vector store set");
    }

    /// The backend for the current credential. It is built on first use and
    /// rebuilt only after the API key or base URL changes.
    fn backend(&self) -> FinderResult<Arc<dyn Backend>> {
        if !self.config.has_api_key() {
            return Err(FinderError::MissingApiKey);
        }
        let mut connection = self
            .connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(current) = connection.as_ref().filter(|c| c.serves(&self.config)) {
            return Ok(current.backend.clone());
        }

        let backend = self.connector.connect(&self.config);
        *connection = Some(Connection {
            api_key: self.config.api_key().to_string(),
            base_url: self.config.base_url().map(ToString::to_string),
            backend: backend.clone(),
        });
        Ok(backend)
    }

    fn index_client(&self) -> FinderResult<IndexClient> {
        self.backend().map(IndexClient::new)
    }

    fn active_store_id(&self) -> FinderResult<&str> {
        self.config
            .active_store_id()
            .ok_or(FinderError::NoActiveStore)
    }

    /// Ask whether a bug bounty program exists for `input` using the active
    /// store as the knowledge base.
    pub async fn find_program(&self, input: &str) -> FinderResult<Extraction> {
        if input.trim().is_empty() {
            return Err(FinderError::EmptyInput);
        }
        let backend = self.backend()?;
        let store_id = self.active_store_id()?;

        let prompt = query::build_query(input);
        let raw = query::submit_query(backend.as_ref(), prompt, store_id, self.config.model())
            .await?;
        Ok(extract::extract(&raw))
    }

    /// Create a store and make it the active one.
    pub async fn create_store(&mut self, name: &str) -> FinderResult<Collection> {
        let collection = self.index_client()?.create_collection(name).await?;
        self.config.set_active_store(collection.id.clone());
        Ok(collection)
    }

    pub async fn list_stores(&self) -> FinderResult<Vec<Collection>> {
        Ok(self.index_client()?.list_collections().await?.collect())
    }

    /// Delete a store with its files. Clears the active store when it is the
    /// one deleted.
    pub async fn delete_store(&mut self, store_id: &str) -> FinderResult<CascadeDeleteReport> {
        let report = self.index_client()?.delete_collection(store_id).await?;
        if self.config.active_store_id() == Some(store_id) {
            self.config.clear_active_store();
        }
        Ok(report)
    }

    /// Files of `store_id`, or of the active store when `None`.
    pub async fn list_files(&self, store_id: Option<&str>) -> FinderResult<Vec<FileEntry>> {
        let client = self.index_client()?;
        let store_id = match store_id {
            Some(store_id) => store_id,
            None => self.active_store_id()?,
        };
        client.list_files(store_id).await
    }

    /// Take a file out of a store's retrieval scope. The file object stays.
    pub async fn remove_file(&self, store_id: Option<&str>, file_id: &str) -> FinderResult<()> {
        let client = self.index_client()?;
        let store_id = match store_id {
            Some(store_id) => store_id,
            None => self.active_store_id()?,
        };
        client.detach_file(store_id, file_id).await
    }

    /// Upload, attach and wait for each file in turn. A failing file is
    /// recorded and the batch moves on to the next one. Once `cancel` fires,
    /// the remaining files are recorded as cancelled.
    pub async fn upload_files(
        &self,
        files: Vec<UploadFile>,
        cancel: &CancellationToken,
    ) -> FinderResult<UploadReport> {
        if files.is_empty() {
            return Err(FinderError::NoFiles);
        }
        let client = self.index_client()?;
        let store_id = self.active_store_id()?;

        let mut report = UploadReport::default();
        for file in files {
            if cancel.is_cancelled() {
                report.failed.push(ItemFailure {
                    item: file.filename,
                    error: FinderError::Cancelled.to_string(),
                });
                continue;
            }
            if !upload::is_supported(&file.filename) {
                report.failed.push(ItemFailure {
                    error: FinderError::UnsupportedFile(file.filename.clone()).to_string(),
                    item: file.filename,
                });
                continue;
            }

            let UploadFile { filename, bytes } = file;
            match client.attach_file(store_id, bytes, &filename).await {
                Ok(file_id) => {
                    let status =
                        wait_until_indexed(&client, store_id, &file_id, self.upload_poll, cancel)
                            .await;
                    info!(%filename, %file_id, %status, "upload finished");
                    report.succeeded.push(UploadedFile {
                        filename,
                        file_id,
                        status,
                    });
                }
                Err(error) => {
                    warn!(%filename, %error, "upload failed");
                    report.failed.push(ItemFailure {
                        item: filename,
                        error: error.to_string(),
                    });
                }
            }
        }
        Ok(report)
    }
}
