use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::Mutex,
};

use crate::{
    openai::{
        DeletionStatus, FileObject, FileUpload, ResponseCreateParams, VectorStore,
        VectorStoreCreateParams, VectorStoreFile,
    },
    DocumentIndex, RawResponse, ResponsesService, ServiceError, ServiceResult,
};
use reqwest::StatusCode;

/// The remote operations a [`MockOpenAI`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    CreateVectorStore,
    ListVectorStores,
    DeleteVectorStore,
    ListVectorStoreFiles,
    CreateVectorStoreFile,
    DeleteVectorStoreFile,
    CreateFile,
    RetrieveFile,
    DeleteFile,
    CreateResponse,
}

/// A call received by a [`MockOpenAI`], in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    CreateVectorStore(Option<String>),
    ListVectorStores,
    DeleteVectorStore(String),
    ListVectorStoreFiles(String),
    CreateVectorStoreFile {
        vector_store_id: String,
        file_id: String,
    },
    DeleteVectorStoreFile {
        vector_store_id: String,
        file_id: String,
    },
    CreateFile(String),
    RetrieveFile(String),
    DeleteFile(String),
    CreateResponse(ResponseCreateParams),
}

impl MockCall {
    #[must_use]
    pub fn operation(&self) -> MockOperation {
        match self {
            Self::CreateVectorStore(_) => MockOperation::CreateVectorStore,
            Self::ListVectorStores => MockOperation::ListVectorStores,
            Self::DeleteVectorStore(_) => MockOperation::DeleteVectorStore,
            Self::ListVectorStoreFiles(_) => MockOperation::ListVectorStoreFiles,
            Self::CreateVectorStoreFile { .. } => MockOperation::CreateVectorStoreFile,
            Self::DeleteVectorStoreFile { .. } => MockOperation::DeleteVectorStoreFile,
            Self::CreateFile(_) => MockOperation::CreateFile,
            Self::RetrieveFile(_) => MockOperation::RetrieveFile,
            Self::DeleteFile(_) => MockOperation::DeleteFile,
            Self::CreateResponse(_) => MockOperation::CreateResponse,
        }
    }
}

struct MockFailure {
    operation: MockOperation,
    target: Option<String>,
    error: ServiceError,
}

#[derive(Default)]
struct MockOpenAIState {
    next_id: usize,
    vector_stores: Vec<VectorStore>,
    store_files: HashMap<String, Vec<VectorStoreFile>>,
    files: HashMap<String, FileObject>,
    status_scripts: HashMap<String, VecDeque<String>>,
    failures: Vec<MockFailure>,
    stalled: HashSet<MockOperation>,
    mocked_responses: VecDeque<RawResponse>,
    tracked_calls: Vec<MockCall>,
}

impl MockOpenAIState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_{}", self.next_id)
    }

    fn take_failure(&mut self, operation: MockOperation, target: &str) -> Option<ServiceError> {
        let position = self.failures.iter().position(|failure| {
            failure.operation == operation
                && failure
                    .target
                    .as_deref()
                    .is_none_or(|expected| expected == target)
        })?;
        Some(self.failures.remove(position).error)
    }

    /// Advance every scripted status by one step. The last scripted status
    /// sticks once the script runs out.
    fn advance_statuses(&mut self, vector_store_id: &str) {
        let Some(files) = self.store_files.get_mut(vector_store_id) else {
            return;
        };
        for file in files.iter_mut() {
            if let Some(script) = self.status_scripts.get_mut(&file.id) {
                if script.len() > 1 {
                    if let Some(status) = script.pop_front() {
                        file.status = status;
                    }
                } else if let Some(status) = script.front() {
                    file.status.clone_from(status);
                }
            }
        }
    }
}

fn not_found(kind: &str, id: &str) -> ServiceError {
    ServiceError::StatusCode(
        StatusCode::NOT_FOUND,
        format!("No {kind} found with id '{id}'."),
    )
}

/// An in-memory stand-in for the `OpenAI` vector store, files and responses
/// endpoints. It keeps real state (stores, files, attachments) so flows can be
/// exercised end to end, records every call, and lets tests inject failures
/// and scripted indexing statuses.
pub struct MockOpenAI {
    state: Mutex<MockOpenAIState>,
}

impl Default for MockOpenAI {
    fn default() -> Self {
        Self::new()
    }
}

impl MockOpenAI {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockOpenAIState::default()),
        }
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MockOpenAIState) -> T) -> T {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&mut state)
    }

    /// Seed a vector store and return its ID.
    pub fn add_vector_store(&self, name: &str) -> String {
        self.with_state(|state| {
            let id = state.next_id("vs");
            state.vector_stores.push(VectorStore {
                id: id.clone(),
                name: Some(name.to_string()),
                created_at: 0,
                status: Some("completed".to_string()),
                file_counts: None,
            });
            state.store_files.insert(id.clone(), Vec::new());
            id
        })
    }

    /// Seed a file object attached to a vector store and return its ID.
    pub fn add_store_file(&self, vector_store_id: &str, filename: &str, status: &str) -> String {
        self.with_state(|state| {
            let id = state.next_id("file");
            state.files.insert(
                id.clone(),
                FileObject {
                    id: id.clone(),
                    bytes: 0,
                    created_at: 0,
                    filename: filename.to_string(),
                    purpose: "assistants".to_string(),
                },
            );
            state
                .store_files
                .entry(vector_store_id.to_string())
                .or_default()
                .push(VectorStoreFile {
                    id: id.clone(),
                    vector_store_id: vector_store_id.to_string(),
                    status: status.to_string(),
                    last_error: None,
                });
            id
        })
    }

    /// Statuses reported for a file on successive listings of its store.
    pub fn script_file_statuses(&self, file_id: &str, statuses: &[&str]) {
        self.with_state(|state| {
            state.status_scripts.insert(
                file_id.to_string(),
                statuses.iter().map(ToString::to_string).collect(),
            );
        });
    }

    /// Fail the next call of `operation`. With a `target`, only a call
    /// addressing that ID (store ID or file ID) consumes the failure.
    pub fn fail_next(&self, operation: MockOperation, target: Option<&str>, error: ServiceError) {
        self.with_state(|state| {
            state.failures.push(MockFailure {
                operation,
                target: target.map(ToString::to_string),
                error,
            });
        });
    }

    /// Make every later call of `operation` hang without ever resolving, as
    /// over a stalled connection. Stalled calls are not tracked.
    pub fn stall(&self, operation: MockOperation) {
        self.with_state(|state| {
            state.stalled.insert(operation);
        });
    }

    async fn pass_stall(&self, operation: MockOperation) {
        if self.with_state(|state| state.stalled.contains(&operation)) {
            std::future::pending::<()>().await;
        }
    }

    /// Queue a raw body for the next `create_response` call.
    pub fn enqueue_response(&self, response: RawResponse) {
        self.with_state(|state| state.mocked_responses.push_back(response));
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.with_state(|state| state.tracked_calls.clone())
    }

    pub fn call_count(&self, operation: MockOperation) -> usize {
        self.with_state(|state| {
            state
                .tracked_calls
                .iter()
                .filter(|call| call.operation() == operation)
                .count()
        })
    }

    pub fn vector_store_ids(&self) -> Vec<String> {
        self.with_state(|state| state.vector_stores.iter().map(|vs| vs.id.clone()).collect())
    }

    pub fn file_ids(&self) -> Vec<String> {
        self.with_state(|state| {
            let mut ids: Vec<String> = state.files.keys().cloned().collect();
            ids.sort();
            ids
        })
    }

    /// Forget tracked calls while keeping stores, files and scripts.
    pub fn reset(&self) {
        self.with_state(|state| state.tracked_calls.clear());
    }
}

#[async_trait::async_trait]
impl DocumentIndex for MockOpenAI {
    async fn create_vector_store(
        &self,
        params: VectorStoreCreateParams,
    ) -> ServiceResult<VectorStore> {
        self.pass_stall(MockOperation::CreateVectorStore).await;
        self.with_state(|state| {
            state
                .tracked_calls
                .push(MockCall::CreateVectorStore(params.name.clone()));
            if let Some(error) = state.take_failure(MockOperation::CreateVectorStore, "") {
                return Err(error);
            }
            let id = state.next_id("vs");
            let vector_store = VectorStore {
                id: id.clone(),
                name: params.name,
                created_at: 0,
                status: Some("completed".to_string()),
                file_counts: None,
            };
            state.vector_stores.push(vector_store.clone());
            state.store_files.insert(id, Vec::new());
            Ok(vector_store)
        })
    }

    async fn list_vector_stores(&self) -> ServiceResult<Vec<VectorStore>> {
        self.pass_stall(MockOperation::ListVectorStores).await;
        self.with_state(|state| {
            state.tracked_calls.push(MockCall::ListVectorStores);
            if let Some(error) = state.take_failure(MockOperation::ListVectorStores, "") {
                return Err(error);
            }
            Ok(state.vector_stores.iter().rev().cloned().collect())
        })
    }

    async fn delete_vector_store(&self, vector_store_id: &str) -> ServiceResult<DeletionStatus> {
        self.pass_stall(MockOperation::DeleteVectorStore).await;
        self.with_state(|state| {
            state
                .tracked_calls
                .push(MockCall::DeleteVectorStore(vector_store_id.to_string()));
            if let Some(error) = state.take_failure(MockOperation::DeleteVectorStore, vector_store_id)
            {
                return Err(error);
            }
            let before = state.vector_stores.len();
            state.vector_stores.retain(|vs| vs.id != vector_store_id);
            if state.vector_stores.len() == before {
                return Err(not_found("vector store", vector_store_id));
            }
            state.store_files.remove(vector_store_id);
            Ok(DeletionStatus {
                id: vector_store_id.to_string(),
                deleted: true,
            })
        })
    }

    async fn list_vector_store_files(
        &self,
        vector_store_id: &str,
    ) -> ServiceResult<Vec<VectorStoreFile>> {
        self.pass_stall(MockOperation::ListVectorStoreFiles).await;
        self.with_state(|state| {
            state
                .tracked_calls
                .push(MockCall::ListVectorStoreFiles(vector_store_id.to_string()));
            if let Some(error) =
                state.take_failure(MockOperation::ListVectorStoreFiles, vector_store_id)
            {
                return Err(error);
            }
            if !state.store_files.contains_key(vector_store_id) {
                return Err(not_found("vector store", vector_store_id));
            }
            state.advance_statuses(vector_store_id);
            Ok(state
                .store_files
                .get(vector_store_id)
                .cloned()
                .unwrap_or_default())
        })
    }

    async fn create_vector_store_file(
        &self,
        vector_store_id: &str,
        file_id: &str,
    ) -> ServiceResult<VectorStoreFile> {
        self.pass_stall(MockOperation::CreateVectorStoreFile).await;
        self.with_state(|state| {
            state.tracked_calls.push(MockCall::CreateVectorStoreFile {
                vector_store_id: vector_store_id.to_string(),
                file_id: file_id.to_string(),
            });
            if let Some(error) = state.take_failure(MockOperation::CreateVectorStoreFile, file_id) {
                return Err(error);
            }
            if !state.files.contains_key(file_id) {
                return Err(not_found("file", file_id));
            }
            let Some(files) = state.store_files.get_mut(vector_store_id) else {
                return Err(not_found("vector store", vector_store_id));
            };
            let file = VectorStoreFile {
                id: file_id.to_string(),
                vector_store_id: vector_store_id.to_string(),
                status: "in_progress".to_string(),
                last_error: None,
            };
            files.push(file.clone());
            Ok(file)
        })
    }

    async fn delete_vector_store_file(
        &self,
        vector_store_id: &str,
        file_id: &str,
    ) -> ServiceResult<DeletionStatus> {
        self.pass_stall(MockOperation::DeleteVectorStoreFile).await;
        self.with_state(|state| {
            state.tracked_calls.push(MockCall::DeleteVectorStoreFile {
                vector_store_id: vector_store_id.to_string(),
                file_id: file_id.to_string(),
            });
            if let Some(error) = state.take_failure(MockOperation::DeleteVectorStoreFile, file_id) {
                return Err(error);
            }
            let Some(files) = state.store_files.get_mut(vector_store_id) else {
                return Err(not_found("vector store", vector_store_id));
            };
            let before = files.len();
            files.retain(|file| file.id != file_id);
            if files.len() == before {
                return Err(not_found("file", file_id));
            }
            Ok(DeletionStatus {
                id: file_id.to_string(),
                deleted: true,
            })
        })
    }

    async fn create_file(&self, upload: FileUpload) -> ServiceResult<FileObject> {
        self.pass_stall(MockOperation::CreateFile).await;
        self.with_state(|state| {
            state
                .tracked_calls
                .push(MockCall::CreateFile(upload.filename.clone()));
            if let Some(error) = state.take_failure(MockOperation::CreateFile, &upload.filename) {
                return Err(error);
            }
            let id = state.next_id("file");
            let file = FileObject {
                id: id.clone(),
                bytes: upload.bytes.len() as u64,
                created_at: 0,
                filename: upload.filename,
                purpose: upload.purpose.as_str().to_string(),
            };
            state.files.insert(id, file.clone());
            Ok(file)
        })
    }

    async fn retrieve_file(&self, file_id: &str) -> ServiceResult<FileObject> {
        self.pass_stall(MockOperation::RetrieveFile).await;
        self.with_state(|state| {
            state
                .tracked_calls
                .push(MockCall::RetrieveFile(file_id.to_string()));
            if let Some(error) = state.take_failure(MockOperation::RetrieveFile, file_id) {
                return Err(error);
            }
            state
                .files
                .get(file_id)
                .cloned()
                .ok_or_else(|| not_found("file", file_id))
        })
    }

    async fn delete_file(&self, file_id: &str) -> ServiceResult<DeletionStatus> {
        self.pass_stall(MockOperation::DeleteFile).await;
        self.with_state(|state| {
            state
                .tracked_calls
                .push(MockCall::DeleteFile(file_id.to_string()));
            if let Some(error) = state.take_failure(MockOperation::DeleteFile, file_id) {
                return Err(error);
            }
            if state.files.remove(file_id).is_none() {
                return Err(not_found("file", file_id));
            }
            for files in state.store_files.values_mut() {
                files.retain(|file| file.id != file_id);
            }
            Ok(DeletionStatus {
                id: file_id.to_string(),
                deleted: true,
            })
        })
    }
}

#[async_trait::async_trait]
impl ResponsesService for MockOpenAI {
    async fn create_response(&self, params: ResponseCreateParams) -> ServiceResult<RawResponse> {
        self.pass_stall(MockOperation::CreateResponse).await;
        self.with_state(|state| {
            state.tracked_calls.push(MockCall::CreateResponse(params));
            if let Some(error) = state.take_failure(MockOperation::CreateResponse, "") {
                return Err(error);
            }
            state.mocked_responses.pop_front().ok_or_else(|| {
                ServiceError::Invariant("mock", "no mocked response enqueued".to_string())
            })
        })
    }
}
