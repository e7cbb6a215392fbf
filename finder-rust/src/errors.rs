use bbp_sdk::ServiceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinderError {
    /// No credential configured. Raised before any request is made.
    #[error("OpenAI API key is not set. Provide it with --api-key or OPENAI_API_KEY.")]
    MissingApiKey,
    #[error(
        "No active vector store set. Create one or select an existing store as the knowledge base."
    )]
    NoActiveStore,
    #[error("Please provide some input (domain, email, org name, etc.).")]
    EmptyInput,
    #[error("Please choose one or more files to upload.")]
    NoFiles,
    #[error("Unsupported file type: {0}")]
    UnsupportedFile(String),
    #[error("Upload cancelled before this file was processed.")]
    Cancelled,
    /// The store is gone remotely, typically right after a deletion. The
    /// session is still usable; refresh the listing or pick another store.
    #[error("Vector store {0} no longer exists. Refresh the store list.")]
    StoreNotFound(String),
    /// Any API-level failure, with the provider's message.
    #[error("{0}")]
    Remote(#[from] ServiceError),
}

pub type FinderResult<T> = Result<T, FinderError>;
