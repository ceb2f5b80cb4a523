// ABOUTME: Transfer error types with SNAFU pattern.
// ABOUTME: Covers reading the artifact and each phase of a (multipart) upload.

use std::path::PathBuf;

use snafu::Snafu;

/// Errors from an object-store transfer.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum TransferError {
    #[snafu(display("failed to read artifact {}: {source}", path.display()))]
    ReadArtifact {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to start upload to s3://{bucket}/{key}: {message}"))]
    Start {
        bucket: String,
        key: String,
        message: String,
    },

    #[snafu(display("failed to upload part {part_number}: {message}"))]
    Part { part_number: i32, message: String },

    #[snafu(display("failed to complete upload: {message}"))]
    Complete { message: String },

    #[snafu(display("failed to abort upload {upload_id}: {message}"))]
    Abort { upload_id: String, message: String },

    #[snafu(display("transfer was canceled"))]
    Canceled,

    #[snafu(display("transfer task failed: {message}"))]
    Task { message: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferErrorKind {
    /// The local file could not be read.
    LocalIo,
    /// The object store rejected or failed a request.
    Remote,
    /// The transfer was stopped before finishing.
    Canceled,
    /// The background task died.
    Internal,
}

impl TransferError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> TransferErrorKind {
        match self {
            TransferError::ReadArtifact { .. } => TransferErrorKind::LocalIo,
            TransferError::Start { .. }
            | TransferError::Part { .. }
            | TransferError::Complete { .. }
            | TransferError::Abort { .. } => TransferErrorKind::Remote,
            TransferError::Canceled => TransferErrorKind::Canceled,
            TransferError::Task { .. } => TransferErrorKind::Internal,
        }
    }
}
