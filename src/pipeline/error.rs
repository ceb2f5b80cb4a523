// ABOUTME: Error types for release pipeline operations.
// ABOUTME: Pre-flight failures (configuration, credentials, artifact) and remote step failures.

use std::path::PathBuf;

use crate::config::ValidationError;
use crate::credentials::NoCredentials;
use crate::naming::RemoteKey;
use crate::platform::PlatformError;
use crate::storage::TransferError;

/// Errors that end a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// A required setting is missing or out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ValidationError),

    /// No credential source produced a key pair.
    #[error(transparent)]
    NoCredentials(#[from] NoCredentials),

    /// The artifact to upload does not exist or is not a regular file.
    #[error("artifact '{}' was not found", .0.display())]
    FileNotFound(PathBuf),

    /// The object store transfer failed.
    #[error("upload to {target} failed: {source}")]
    Transfer {
        target: RemoteKey,
        source: TransferError,
    },

    /// Registering the version or updating the environment failed.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineErrorKind {
    InvalidConfiguration,
    NoCredentials,
    FileNotFound,
    Transfer,
    Platform,
}

impl PipelineError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> PipelineErrorKind {
        match self {
            PipelineError::InvalidConfiguration(_) => PipelineErrorKind::InvalidConfiguration,
            PipelineError::NoCredentials(_) => PipelineErrorKind::NoCredentials,
            PipelineError::FileNotFound(_) => PipelineErrorKind::FileNotFound,
            PipelineError::Transfer { .. } => PipelineErrorKind::Transfer,
            PipelineError::Platform(_) => PipelineErrorKind::Platform,
        }
    }

    /// True when the run stopped before any remote call was made.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self.kind(),
            PipelineErrorKind::InvalidConfiguration
                | PipelineErrorKind::NoCredentials
                | PipelineErrorKind::FileNotFound
        )
    }
}
