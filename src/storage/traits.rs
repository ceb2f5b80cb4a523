// ABOUTME: Object-store capability traits consumed by the uploader.
// ABOUTME: ObjectStore starts a transfer; TransferHandle observes, awaits, and releases it.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::credentials::Credentials;
use crate::naming::RemoteKey;

use super::error::TransferError;
use super::progress::{TransferState, UploadProgress};

/// What to upload and how to split it.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub target: RemoteKey,
    pub path: PathBuf,
    /// Size of each part in bytes. The last part may be smaller.
    pub part_size: u64,
    /// Parts in flight at once.
    pub concurrency: usize,
}

/// Terminal result of a successful transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub bucket: String,
    pub key: String,
    pub e_tag: Option<String>,
    pub version_id: Option<String>,
}

/// Starts transfers into an object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Begin uploading `request.path` to `request.target`.
    ///
    /// Returns as soon as the transfer is running; the work continues in the
    /// background and is observed through the returned handle.
    async fn begin_upload(
        &self,
        request: &UploadRequest,
        credentials: &Credentials,
    ) -> Result<Box<dyn TransferHandle>, TransferError>;
}

/// A running transfer.
#[async_trait]
pub trait TransferHandle: Send + Sync {
    /// Human description, e.g. `Uploading to s3://bucket/key`.
    fn description(&self) -> String;

    fn total_bytes(&self) -> u64;

    fn bytes_transferred(&self) -> u64;

    fn state(&self) -> TransferState;

    fn is_done(&self) -> bool {
        self.state().is_terminal()
    }

    fn progress(&self) -> UploadProgress {
        UploadProgress {
            total_bytes: self.total_bytes(),
            bytes_transferred: self.bytes_transferred(),
            state: self.state(),
        }
    }

    /// Wait for the transfer to reach a terminal state.
    async fn await_result(&mut self) -> Result<UploadResult, TransferError>;

    /// Release everything the transfer holds. Must be safe to call on every
    /// path, including after a failure or before the result was awaited.
    async fn shutdown(&mut self) -> Result<(), TransferError>;
}
