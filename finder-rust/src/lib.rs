mod backend;
mod config;
mod errors;
pub mod extract;
mod index_client;
mod poller;
pub mod query;
mod session;
pub mod upload;

pub use backend::{Backend, Connector, OpenAIConnector};
pub use config::{SessionConfig, DEFAULT_MODEL};
pub use errors::{FinderError, FinderResult};
pub use extract::{Citation, Extraction};
pub use index_client::{
    CascadeDeleteReport, Collection, FileEntry, FileStatus, IndexClient, ItemFailure,
    UNKNOWN_FILENAME,
};
pub use poller::{wait_until_indexed, IndexingStatus, PollOptions};
pub use session::{Session, UploadReport};
pub use upload::{UploadFile, UploadedFile};
