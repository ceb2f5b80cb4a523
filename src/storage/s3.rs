// ABOUTME: S3 implementation of ObjectStore using multipart uploads.
// ABOUTME: Parts upload concurrently in a background task while the handle reports progress.

use std::io::SeekFrom;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use bytes::Bytes;
use futures::{StreamExt, TryStreamExt, stream};
use parking_lot::Mutex;
use snafu::{OptionExt, ResultExt};
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio::task::JoinHandle;

use crate::aws;
use crate::credentials::Credentials;
use crate::naming::RemoteKey;

use super::error::{
    AbortSnafu, CompleteSnafu, PartSnafu, ReadArtifactSnafu, StartSnafu, TaskSnafu,
    TransferError,
};
use super::progress::TransferState;
use super::traits::{ObjectStore, TransferHandle, UploadRequest, UploadResult};

/// Upper bound on parts in one S3 multipart upload.
pub const MAX_PARTS: u64 = 10_000;

/// One byte range of the artifact, uploaded as a single part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartRange {
    /// 1-based, as S3 expects.
    pub number: i32,
    pub offset: u64,
    pub len: u64,
}

/// Split `total` bytes into parts of `part_size`.
///
/// The part size grows when the file would otherwise need more than
/// [`MAX_PARTS`] parts.
pub fn plan_parts(total: u64, part_size: u64) -> Vec<PartRange> {
    let part_size = part_size.max(total.div_ceil(MAX_PARTS)).max(1);
    let count = total.div_ceil(part_size);

    (0..count)
        .map(|index| {
            let offset = index * part_size;
            PartRange {
                number: (index + 1) as i32,
                offset,
                len: part_size.min(total - offset),
            }
        })
        .collect()
}

/// Uploads artifacts to S3.
#[derive(Debug, Clone, Default)]
pub struct S3Store {
    region: Option<String>,
}

impl S3Store {
    pub fn new(region: Option<String>) -> Self {
        Self { region }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn begin_upload(
        &self,
        request: &UploadRequest,
        credentials: &Credentials,
    ) -> Result<Box<dyn TransferHandle>, TransferError> {
        let metadata = tokio::fs::metadata(&request.path)
            .await
            .context(ReadArtifactSnafu {
                path: &request.path,
            })?;

        let config = aws::sdk_config(self.region.as_deref(), credentials).await;
        let client = Client::new(&config);
        let shared = Arc::new(Shared::new(metadata.len()));

        tracing::debug!(
            destination = %request.target,
            size = metadata.len(),
            part_size = request.part_size,
            "starting S3 upload"
        );

        let task = tokio::spawn(run_upload(
            client.clone(),
            request.clone(),
            Arc::clone(&shared),
        ));

        Ok(Box::new(S3Transfer {
            description: format!("Uploading to {}", request.target),
            shared,
            task: Some(task),
            client,
            target: request.target.clone(),
        }))
    }
}

/// State shared between the upload task and its handle.
#[derive(Debug)]
struct Shared {
    total: u64,
    transferred: AtomicU64,
    state: Mutex<TransferState>,
    /// Set while a multipart upload exists server-side and has not been
    /// completed or aborted.
    upload_id: Mutex<Option<String>>,
}

impl Shared {
    fn new(total: u64) -> Self {
        Self {
            total,
            transferred: AtomicU64::new(0),
            state: Mutex::new(TransferState::Queued),
            upload_id: Mutex::new(None),
        }
    }

    fn set_state(&self, state: TransferState) {
        *self.state.lock() = state;
    }

    fn add_bytes(&self, bytes: u64) {
        self.transferred.fetch_add(bytes, Ordering::Relaxed);
    }
}

/// Handle to a running S3 upload.
pub struct S3Transfer {
    description: String,
    shared: Arc<Shared>,
    task: Option<JoinHandle<Result<UploadResult, TransferError>>>,
    client: Client,
    target: RemoteKey,
}

#[async_trait]
impl TransferHandle for S3Transfer {
    fn description(&self) -> String {
        self.description.clone()
    }

    fn total_bytes(&self) -> u64 {
        self.shared.total
    }

    fn bytes_transferred(&self) -> u64 {
        self.shared.transferred.load(Ordering::Relaxed)
    }

    fn state(&self) -> TransferState {
        *self.shared.state.lock()
    }

    /// Also done once the task has ended without recording a terminal
    /// state, e.g. after a panic, so the caller moves on to `await_result`.
    fn is_done(&self) -> bool {
        self.state().is_terminal() || self.task.as_ref().is_none_or(|task| task.is_finished())
    }

    async fn await_result(&mut self) -> Result<UploadResult, TransferError> {
        let Some(task) = self.task.as_mut() else {
            return TaskSnafu {
                message: "result was already taken",
            }
            .fail();
        };

        let joined = task.await;
        self.task = None;

        match joined {
            Ok(result) => result,
            Err(err) if err.is_cancelled() => Err(TransferError::Canceled),
            Err(err) => TaskSnafu {
                message: err.to_string(),
            }
            .fail(),
        }
    }

    async fn shutdown(&mut self) -> Result<(), TransferError> {
        if let Some(task) = self.task.take()
            && !task.is_finished()
        {
            task.abort();
            self.shared.set_state(TransferState::Canceled);
        }

        let pending = self.shared.upload_id.lock().take();
        if let Some(upload_id) = pending {
            abort_upload(&self.client, &self.target, &upload_id).await?;
        }
        Ok(())
    }
}

async fn run_upload(
    client: Client,
    request: UploadRequest,
    shared: Arc<Shared>,
) -> Result<UploadResult, TransferError> {
    shared.set_state(TransferState::InProgress);

    let result = if shared.total <= request.part_size {
        put_single(&client, &request, &shared).await
    } else {
        put_multipart(&client, &request, &shared).await
    };

    shared.set_state(match &result {
        Ok(_) => TransferState::Completed,
        Err(TransferError::Canceled) => TransferState::Canceled,
        Err(_) => TransferState::Failed,
    });
    result
}

async fn put_single(
    client: &Client,
    request: &UploadRequest,
    shared: &Shared,
) -> Result<UploadResult, TransferError> {
    let target = &request.target;
    let body = tokio::fs::read(&request.path)
        .await
        .context(ReadArtifactSnafu {
            path: &request.path,
        })?;
    let len = body.len() as u64;

    let output = client
        .put_object()
        .bucket(&target.bucket)
        .key(&target.key)
        .body(ByteStream::from(body))
        .send()
        .await
        .map_err(|err| {
            StartSnafu {
                bucket: &target.bucket,
                key: &target.key,
                message: DisplayErrorContext(&err).to_string(),
            }
            .build()
        })?;
    shared.add_bytes(len);

    Ok(UploadResult {
        bucket: target.bucket.clone(),
        key: target.key.clone(),
        e_tag: output.e_tag().map(str::to_owned),
        version_id: output.version_id().map(str::to_owned),
    })
}

async fn put_multipart(
    client: &Client,
    request: &UploadRequest,
    shared: &Shared,
) -> Result<UploadResult, TransferError> {
    let target = &request.target;
    let parts = plan_parts(shared.total, request.part_size);

    let created = client
        .create_multipart_upload()
        .bucket(&target.bucket)
        .key(&target.key)
        .send()
        .await
        .map_err(|err| {
            StartSnafu {
                bucket: &target.bucket,
                key: &target.key,
                message: DisplayErrorContext(&err).to_string(),
            }
            .build()
        })?;
    let upload_id = created
        .upload_id()
        .map(str::to_owned)
        .context(StartSnafu {
            bucket: &target.bucket,
            key: &target.key,
            message: "response did not include an upload id",
        })?;
    *shared.upload_id.lock() = Some(upload_id.clone());

    tracing::debug!(%upload_id, parts = parts.len(), "multipart upload created");

    let id = upload_id.as_str();
    let uploaded = stream::iter(parts)
        .map(move |part| upload_part(client, request, id, part, shared))
        .buffer_unordered(request.concurrency.max(1))
        .try_collect::<Vec<_>>()
        .await;

    let mut completed = match uploaded {
        Ok(completed) => completed,
        Err(err) => {
            release(client, target, &upload_id, shared).await;
            return Err(err);
        }
    };
    completed.sort_by_key(|part| part.part_number());

    let output = client
        .complete_multipart_upload()
        .bucket(&target.bucket)
        .key(&target.key)
        .upload_id(&upload_id)
        .multipart_upload(
            CompletedMultipartUpload::builder()
                .set_parts(Some(completed))
                .build(),
        )
        .send()
        .await;

    match output {
        Ok(output) => {
            shared.upload_id.lock().take();
            Ok(UploadResult {
                bucket: target.bucket.clone(),
                key: target.key.clone(),
                e_tag: output.e_tag().map(str::to_owned),
                version_id: output.version_id().map(str::to_owned),
            })
        }
        Err(err) => {
            let message = DisplayErrorContext(&err).to_string();
            release(client, target, &upload_id, shared).await;
            CompleteSnafu { message }.fail()
        }
    }
}

async fn upload_part(
    client: &Client,
    request: &UploadRequest,
    upload_id: &str,
    part: PartRange,
    shared: &Shared,
) -> Result<CompletedPart, TransferError> {
    let body = read_range(&request.path, part.offset, part.len)
        .await
        .context(ReadArtifactSnafu {
            path: &request.path,
        })?;

    let output = client
        .upload_part()
        .bucket(&request.target.bucket)
        .key(&request.target.key)
        .upload_id(upload_id)
        .part_number(part.number)
        .body(ByteStream::from(body))
        .send()
        .await
        .map_err(|err| {
            PartSnafu {
                part_number: part.number,
                message: DisplayErrorContext(&err).to_string(),
            }
            .build()
        })?;
    shared.add_bytes(part.len);

    Ok(CompletedPart::builder()
        .part_number(part.number)
        .set_e_tag(output.e_tag().map(str::to_owned))
        .build())
}

async fn read_range(path: &Path, offset: u64, len: u64) -> std::io::Result<Bytes> {
    let mut file = tokio::fs::File::open(path).await?;
    file.seek(SeekFrom::Start(offset)).await?;
    let mut buf = vec![0u8; len as usize];
    file.read_exact(&mut buf).await?;
    Ok(Bytes::from(buf))
}

/// Abort a failed multipart upload. On failure the id stays recorded so
/// `shutdown` retries it.
async fn release(client: &Client, target: &RemoteKey, upload_id: &str, shared: &Shared) {
    match abort_upload(client, target, upload_id).await {
        Ok(()) => {
            shared.upload_id.lock().take();
        }
        Err(err) => tracing::warn!("{err}"),
    }
}

async fn abort_upload(
    client: &Client,
    target: &RemoteKey,
    upload_id: &str,
) -> Result<(), TransferError> {
    client
        .abort_multipart_upload()
        .bucket(&target.bucket)
        .key(&target.key)
        .upload_id(upload_id)
        .send()
        .await
        .map_err(|err| {
            AbortSnafu {
                upload_id,
                message: DisplayErrorContext(&err).to_string(),
            }
            .build()
        })?;
    tracing::debug!(%upload_id, "multipart upload aborted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::TransferErrorKind;
    use aws_sdk_s3::config::{BehaviorVersion, Region};

    const MIB: u64 = 1024 * 1024;

    fn offline_client() -> Client {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(aws::DEFAULT_REGION))
            .build();
        Client::from_conf(config)
    }

    fn transfer_for(task: JoinHandle<Result<UploadResult, TransferError>>) -> S3Transfer {
        S3Transfer {
            description: "Uploading to s3://releases/shop.war".to_string(),
            shared: Arc::new(Shared::new(10)),
            task: Some(task),
            client: offline_client(),
            target: RemoteKey::new("releases", "shop.war"),
        }
    }

    #[tokio::test]
    async fn panicked_task_counts_as_done() {
        let task: JoinHandle<Result<UploadResult, TransferError>> =
            tokio::spawn(async { panic!("upload task blew up") });
        let mut transfer = transfer_for(task);
        transfer.shared.set_state(TransferState::InProgress);

        while !transfer.task.as_ref().is_some_and(|task| task.is_finished()) {
            tokio::task::yield_now().await;
        }

        assert_eq!(transfer.state(), TransferState::InProgress);
        assert!(transfer.is_done());

        let err = transfer.await_result().await.unwrap_err();
        assert_eq!(err.kind(), TransferErrorKind::Internal);
        transfer.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn running_task_is_not_done() {
        let task = tokio::spawn(async {
            std::future::pending::<Result<UploadResult, TransferError>>().await
        });
        let mut transfer = transfer_for(task);
        transfer.shared.set_state(TransferState::InProgress);

        assert!(!transfer.is_done());
        transfer.shutdown().await.unwrap();
        assert_eq!(transfer.state(), TransferState::Canceled);
    }

    #[test]
    fn small_file_is_one_part() {
        let parts = plan_parts(100, 5 * MIB);
        assert_eq!(
            parts,
            vec![PartRange {
                number: 1,
                offset: 0,
                len: 100
            }]
        );
    }

    #[test]
    fn last_part_holds_the_remainder() {
        let parts = plan_parts(12 * MIB, 5 * MIB);
        let lens: Vec<u64> = parts.iter().map(|p| p.len).collect();
        assert_eq!(lens, vec![5 * MIB, 5 * MIB, 2 * MIB]);
        assert_eq!(parts[2].offset, 10 * MIB);
        assert_eq!(parts[2].number, 3);
    }

    #[test]
    fn empty_file_has_no_parts() {
        assert!(plan_parts(0, 5 * MIB).is_empty());
    }

    #[test]
    fn part_size_grows_to_stay_under_the_part_limit() {
        let total = 100_000 * MIB;
        let parts = plan_parts(total, 5 * MIB);

        assert!(parts.len() as u64 <= MAX_PARTS);
        assert_eq!(parts.iter().map(|p| p.len).sum::<u64>(), total);
    }

    #[test]
    fn parts_are_contiguous() {
        let parts = plan_parts(17 * MIB + 3, 5 * MIB);
        let mut expected_offset = 0;
        for (index, part) in parts.iter().enumerate() {
            assert_eq!(part.number, index as i32 + 1);
            assert_eq!(part.offset, expected_offset);
            expected_offset += part.len;
        }
        assert_eq!(expected_offset, 17 * MIB + 3);
    }
}
