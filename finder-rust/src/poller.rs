use crate::{FileStatus, IndexClient};
use serde::Serialize;
use std::{fmt, time::Duration};
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Bounds for waiting on a file to be indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollOptions {
    /// The budget used right after an upload.
    pub const UPLOAD: Self = Self {
        timeout: Duration::from_secs(90),
        interval: Duration::from_secs(1),
    };
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "raw", rename_all = "snake_case")]
pub enum IndexingStatus {
    Completed,
    /// The remote reported a failure; the raw status is kept.
    Failed(String),
    Timeout,
    Cancelled,
}

impl fmt::Display for IndexingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completed => f.write_str("completed"),
            Self::Failed(raw) => f.write_str(raw),
            Self::Timeout => f.write_str("timeout"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Poll the collection's file listing until `file_id` reaches a terminal
/// status, the timeout elapses, or `cancel` fires. One status check per
/// interval; errors during a check count as "not yet terminal". A check that
/// hangs is abandoned at the deadline or on cancellation.
pub async fn wait_until_indexed(
    client: &IndexClient,
    collection_id: &str,
    file_id: &str,
    options: PollOptions,
    cancel: &CancellationToken,
) -> IndexingStatus {
    let deadline = Instant::now() + options.timeout;

    while Instant::now() < deadline {
        if cancel.is_cancelled() {
            return IndexingStatus::Cancelled;
        }

        let check = tokio::select! {
            () = cancel.cancelled() => return IndexingStatus::Cancelled,
            () = sleep_until(deadline) => return IndexingStatus::Timeout,
            check = client.file_status(collection_id, file_id) => check,
        };

        match check {
            Ok(Some(FileStatus::Completed)) => return IndexingStatus::Completed,
            Ok(Some(FileStatus::Failed(status))) => return IndexingStatus::Failed(status),
            Ok(status) => debug!(file_id, ?status, "file not indexed yet"),
            Err(error) => debug!(file_id, %error, "status check failed, retrying"),
        }

        tokio::select! {
            () = cancel.cancelled() => return IndexingStatus::Cancelled,
            () = sleep(options.interval) => {}
        }
    }

    IndexingStatus::Timeout
}
