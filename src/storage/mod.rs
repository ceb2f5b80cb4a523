// ABOUTME: Object-store access for artifact uploads.
// ABOUTME: Exposes the capability traits, progress types, and the S3 implementation.

mod error;
mod progress;
mod s3;
mod traits;

pub use error::{TransferError, TransferErrorKind};
pub use progress::{
    ProgressTracker, TransferState, UploadProgress, format_progress, pretty_bytes,
};
pub use s3::{MAX_PARTS, PartRange, S3Store, plan_parts};
pub use traits::{ObjectStore, TransferHandle, UploadRequest, UploadResult};
