use crate::{
    openai::{
        DeletionStatus, FileObject, FileUpload, ResponseCreateParams, VectorStore,
        VectorStoreCreateParams, VectorStoreFile,
    },
    ServiceResult,
};

/// The raw body of a completion, kept untyped so callers can fall back to it
/// when the structured shape is not what they expected.
pub type RawResponse = serde_json::Value;

/// Remote collections of files ("vector stores") and the file objects they
/// index. Implementations are pass-throughs; nothing is indexed locally.
#[async_trait::async_trait]
pub trait DocumentIndex: Send + Sync {
    async fn create_vector_store(&self, params: VectorStoreCreateParams)
        -> ServiceResult<VectorStore>;

    /// One page of vector stores, newest first.
    async fn list_vector_stores(&self) -> ServiceResult<Vec<VectorStore>>;

    async fn delete_vector_store(&self, vector_store_id: &str) -> ServiceResult<DeletionStatus>;

    async fn list_vector_store_files(
        &self,
        vector_store_id: &str,
    ) -> ServiceResult<Vec<VectorStoreFile>>;

    /// Attach an uploaded file to a vector store, which starts indexing it.
    async fn create_vector_store_file(
        &self,
        vector_store_id: &str,
        file_id: &str,
    ) -> ServiceResult<VectorStoreFile>;

    /// Detach a file from a vector store. The file object itself survives.
    async fn delete_vector_store_file(
        &self,
        vector_store_id: &str,
        file_id: &str,
    ) -> ServiceResult<DeletionStatus>;

    async fn create_file(&self, upload: FileUpload) -> ServiceResult<FileObject>;

    async fn retrieve_file(&self, file_id: &str) -> ServiceResult<FileObject>;

    async fn delete_file(&self, file_id: &str) -> ServiceResult<DeletionStatus>;
}

/// A hosted completion endpoint that can run tools such as `file_search`.
#[async_trait::async_trait]
pub trait ResponsesService: Send + Sync {
    async fn create_response(&self, params: ResponseCreateParams) -> ServiceResult<RawResponse>;
}
