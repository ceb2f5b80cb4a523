// ABOUTME: Artifact upload step: starts a transfer, polls its progress, awaits the result.
// ABOUTME: Also provides Interrupt, which ends progress polling without canceling the transfer.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::config::UploadConfig;
use crate::credentials::Credentials;
use crate::diagnostics::{Diagnostics, Warning};
use crate::naming::RemoteKey;
use crate::output::Output;
use crate::storage::{
    ObjectStore, ProgressTracker, TransferHandle, UploadRequest, UploadResult, format_progress,
    pretty_bytes,
};

use super::error::PipelineError;

/// What a finished upload produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub bucket: String,
    pub key: String,
    /// ETag reported by the object store.
    pub content_hash: Option<String>,
    pub version_id: Option<String>,
}

impl From<UploadResult> for UploadSummary {
    fn from(result: UploadResult) -> Self {
        UploadSummary {
            bucket: result.bucket,
            key: result.key,
            content_hash: result.e_tag,
            version_id: result.version_id,
        }
    }
}

/// Signals that progress polling should stop.
///
/// Triggering only ends observation. The transfer keeps running and its
/// result is still awaited.
#[derive(Debug, Clone)]
pub struct Interrupt {
    rx: watch::Receiver<bool>,
}

/// Sending side of an [`Interrupt`].
#[derive(Debug, Clone)]
pub struct InterruptHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl InterruptHandle {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

impl Interrupt {
    pub fn channel() -> (InterruptHandle, Interrupt) {
        let (tx, rx) = watch::channel(false);
        (InterruptHandle { tx: Arc::new(tx) }, Interrupt { rx })
    }

    /// An interrupt that never fires.
    pub fn never() -> Interrupt {
        Self::channel().1
    }

    /// Fires on Ctrl-C. Must be called from within a tokio runtime.
    pub fn ctrl_c() -> Interrupt {
        let (handle, interrupt) = Self::channel();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::debug!("interrupt received");
                handle.trigger();
            }
        });
        interrupt
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Sleep for `period`. Returns `false` if interrupted first.
    pub async fn sleep(&mut self, period: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(period) => true,
            _ = triggered(&mut self.rx) => false,
        }
    }
}

async fn triggered(rx: &mut watch::Receiver<bool>) {
    let closed = rx.wait_for(|flag| *flag).await.is_err();
    if closed {
        // No sender left, so this interrupt can never fire.
        std::future::pending::<()>().await;
    }
}

/// Uploads the artifact through an [`ObjectStore`] and reports progress.
pub struct ArtifactUploader<'a> {
    store: &'a dyn ObjectStore,
    output: &'a Output,
    settings: &'a UploadConfig,
}

impl<'a> ArtifactUploader<'a> {
    pub fn new(store: &'a dyn ObjectStore, output: &'a Output, settings: &'a UploadConfig) -> Self {
        Self {
            store,
            output,
            settings,
        }
    }

    /// Upload `path` to `target`.
    ///
    /// The file is checked before anything is sent. Once a transfer has
    /// started it is always shut down, whether it succeeded, failed, or
    /// polling was interrupted.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::FileNotFound` when `path` is not a regular file
    /// and `PipelineError::Transfer` when the object store reports a failure.
    pub async fn upload(
        &self,
        target: &RemoteKey,
        path: &Path,
        credentials: &Credentials,
        interrupt: &mut Interrupt,
        diag: &mut Diagnostics,
    ) -> Result<UploadSummary, PipelineError> {
        match tokio::fs::metadata(path).await {
            Ok(metadata) if metadata.is_file() => {}
            _ => return Err(PipelineError::FileNotFound(path.to_path_buf())),
        }

        let request = UploadRequest {
            target: target.clone(),
            path: path.to_path_buf(),
            part_size: self.settings.part_size,
            concurrency: self.settings.concurrency,
        };
        let mut handle = self
            .store
            .begin_upload(&request, credentials)
            .await
            .map_err(|source| PipelineError::Transfer {
                target: target.clone(),
                source,
            })?;

        self.output.info(&format!(
            "Transfer: {} ({})",
            handle.description(),
            pretty_bytes(handle.total_bytes())
        ));

        if !self.observe(handle.as_ref(), interrupt).await {
            diag.warn(Warning::observation_interrupted(format!(
                "stopped reporting progress for {target}; waiting for the upload to finish"
            )));
        }

        let result = handle.await_result().await;

        if let Err(err) = handle.shutdown().await {
            diag.warn(Warning::transfer_shutdown(format!(
                "failed to release transfer to {target}: {err}"
            )));
        }

        let result = result.map_err(|source| PipelineError::Transfer {
            target: target.clone(),
            source,
        })?;

        self.output.info("Finished:");
        self.output.info(&format!("  Bucket    : {}", result.bucket));
        self.output.info(&format!("  Key       : {}", result.key));
        self.output
            .info(&format!("  ETag      : {}", or_dash(result.e_tag.as_deref())));
        self.output
            .info(&format!("  VersionId : {}", or_dash(result.version_id.as_deref())));

        Ok(UploadSummary::from(result))
    }

    /// Report progress until the transfer is done. Returns `false` if the
    /// interrupt fired first.
    async fn observe(&self, handle: &dyn TransferHandle, interrupt: &mut Interrupt) -> bool {
        let mut tracker = ProgressTracker::default();
        while !handle.is_done() {
            let progress = tracker.observe(handle.progress());
            self.output.info(&format_progress(&progress));

            if !interrupt.sleep(self.settings.poll_interval).await {
                return false;
            }
        }
        tracing::debug!(polls = tracker.samples(), "transfer reached a terminal state");
        true
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}
