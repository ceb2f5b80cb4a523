// ABOUTME: Test support utilities.
// ABOUTME: In-memory ObjectStore and HostingPlatform fakes plus release config helpers.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::sync::Once;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use ebpush::config::{Config, EnvValue};
use ebpush::credentials::Credentials;
use ebpush::naming::RemoteKey;
use ebpush::platform::{
    ApplicationVersion, EnvironmentDescription, EnvironmentUpdate, HostingPlatform,
    PlatformError, VersionRequest,
};
use ebpush::storage::{
    ObjectStore, TransferError, TransferHandle, TransferState, UploadRequest, UploadResult,
};
use parking_lot::Mutex;
use tokio::time::Instant;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter =
            EnvFilter::from_default_env().add_directive("ebpush=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub const ACCESS_KEY: &str = "AKIAEXPLICIT";
pub const SECRET_KEY: &str = "explicit-secret";

/// A complete release config whose artifact is a real 1 MiB file in `dir`.
/// The environment credential source is off so tests never see the host's keys.
pub fn release_config(dir: &Path) -> Config {
    let artifact = dir.join("shop.war");
    std::fs::write(&artifact, vec![0u8; 1024 * 1024]).unwrap();

    let mut config = Config {
        artifact,
        bucket: "releases".to_string(),
        key: "shop.war".to_string(),
        application: "shop".to_string(),
        environment: "shop-prod".to_string(),
        version_label: "1.4.0".to_string(),
        ..Config::default()
    };
    config.credentials.access_key = Some(EnvValue::literal(ACCESS_KEY));
    config.credentials.secret_key = Some(EnvValue::literal(SECRET_KEY));
    config.credentials.environment = false;
    config
}

// =============================================================================
// Object store fake
// =============================================================================

/// How the next transfer behaves.
#[derive(Debug, Clone)]
pub struct TransferScript {
    /// Simulated wall time until the transfer reaches a terminal state.
    pub duration: Duration,
    pub fail_to_start: bool,
    pub fail_at_end: bool,
    pub fail_shutdown: bool,
    /// Every other read of the byte counter comes back lower, like a retried part.
    pub dips: bool,
}

impl Default for TransferScript {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(23),
            fail_to_start: false,
            fail_at_end: false,
            fail_shutdown: false,
            dips: false,
        }
    }
}

#[derive(Default)]
struct StoreLog {
    requests: Mutex<Vec<UploadRequest>>,
    access_keys: Mutex<Vec<String>>,
    shutdowns: AtomicUsize,
}

/// Records every upload and simulates progress against the tokio clock.
#[derive(Clone, Default)]
pub struct FakeStore {
    script: TransferScript,
    log: Arc<StoreLog>,
}

impl FakeStore {
    pub fn new(script: TransferScript) -> Self {
        Self {
            script,
            log: Arc::default(),
        }
    }

    pub fn requests(&self) -> Vec<UploadRequest> {
        self.log.requests.lock().clone()
    }

    pub fn access_keys(&self) -> Vec<String> {
        self.log.access_keys.lock().clone()
    }

    pub fn shutdowns(&self) -> usize {
        self.log.shutdowns.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn begin_upload(
        &self,
        request: &UploadRequest,
        credentials: &Credentials,
    ) -> Result<Box<dyn TransferHandle>, TransferError> {
        self.log.requests.lock().push(request.clone());
        self.log
            .access_keys
            .lock()
            .push(credentials.access_key().to_string());

        if self.script.fail_to_start {
            return Err(TransferError::Start {
                bucket: request.target.bucket.clone(),
                key: request.target.key.clone(),
                message: "access denied".to_string(),
            });
        }

        let total = std::fs::metadata(&request.path)
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(Box::new(FakeTransfer {
            target: request.target.clone(),
            total,
            started: Instant::now(),
            script: self.script.clone(),
            reads: AtomicU64::new(0),
            log: Arc::clone(&self.log),
        }))
    }
}

struct FakeTransfer {
    target: RemoteKey,
    total: u64,
    started: Instant,
    script: TransferScript,
    reads: AtomicU64,
    log: Arc<StoreLog>,
}

impl FakeTransfer {
    fn finished(&self) -> bool {
        self.started.elapsed() >= self.script.duration
    }

    fn raw_bytes(&self) -> u64 {
        if self.finished() {
            return if self.script.fail_at_end {
                self.total / 2
            } else {
                self.total
            };
        }
        let elapsed = self.started.elapsed().as_millis() as u64;
        let duration = self.script.duration.as_millis().max(1) as u64;
        self.total * elapsed / duration
    }
}

#[async_trait]
impl TransferHandle for FakeTransfer {
    fn description(&self) -> String {
        format!("Uploading to {}", self.target)
    }

    fn total_bytes(&self) -> u64 {
        self.total
    }

    fn bytes_transferred(&self) -> u64 {
        let raw = self.raw_bytes();
        let read = self.reads.fetch_add(1, Ordering::SeqCst);
        if self.script.dips && read % 2 == 1 {
            raw.saturating_sub(self.total / 10)
        } else {
            raw
        }
    }

    fn state(&self) -> TransferState {
        match (self.finished(), self.script.fail_at_end) {
            (false, _) => TransferState::InProgress,
            (true, false) => TransferState::Completed,
            (true, true) => TransferState::Failed,
        }
    }

    async fn await_result(&mut self) -> Result<UploadResult, TransferError> {
        tokio::time::sleep_until(self.started + self.script.duration).await;
        if self.script.fail_at_end {
            return Err(TransferError::Part {
                part_number: 2,
                message: "connection reset by peer".to_string(),
            });
        }
        Ok(UploadResult {
            bucket: self.target.bucket.clone(),
            key: self.target.key.clone(),
            e_tag: Some("\"fake-etag\"".to_string()),
            version_id: Some("v1".to_string()),
        })
    }

    async fn shutdown(&mut self) -> Result<(), TransferError> {
        self.log.shutdowns.fetch_add(1, Ordering::SeqCst);
        if self.script.fail_shutdown {
            return Err(TransferError::Abort {
                upload_id: "upload-1".to_string(),
                message: "service unavailable".to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Hosting platform fake
// =============================================================================

/// One call made against [`FakePlatform`], with the access key it used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformCall {
    CreateVersion(VersionRequest, String),
    UpdateEnvironment(EnvironmentUpdate, String),
}

#[derive(Default)]
pub struct FakePlatform {
    fail_create: bool,
    fail_update: bool,
    calls: Mutex<Vec<PlatformCall>>,
}

impl FakePlatform {
    /// Rejects version registration, like a duplicate version label.
    pub fn failing_create() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    pub fn failing_update() -> Self {
        Self {
            fail_update: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl HostingPlatform for FakePlatform {
    async fn create_application_version(
        &self,
        request: &VersionRequest,
        credentials: &Credentials,
    ) -> Result<ApplicationVersion, PlatformError> {
        self.calls.lock().push(PlatformCall::CreateVersion(
            request.clone(),
            credentials.access_key().to_string(),
        ));

        if self.fail_create {
            return Err(PlatformError::CreateVersion {
                application: request.application.clone(),
                version_label: request.version_label.clone(),
                message: "Application Version already exists".to_string(),
            });
        }

        Ok(ApplicationVersion {
            application: request.application.clone(),
            version_label: request.version_label.clone(),
            source_bucket: request.source.bucket.clone(),
            source_key: request.source.key.clone(),
        })
    }

    async fn update_environment(
        &self,
        request: &EnvironmentUpdate,
        credentials: &Credentials,
    ) -> Result<EnvironmentDescription, PlatformError> {
        self.calls.lock().push(PlatformCall::UpdateEnvironment(
            request.clone(),
            credentials.access_key().to_string(),
        ));

        if self.fail_update {
            return Err(PlatformError::UpdateEnvironment {
                environment: request.environment.clone(),
                version_label: request.version_label.clone(),
                message: "No Environment found".to_string(),
            });
        }

        Ok(EnvironmentDescription {
            application: request.application.clone(),
            environment_id: Some("e-abc123".to_string()),
            environment_name: request.environment.clone(),
            version_label: request.version_label.clone(),
            status: Some("Updating".to_string()),
            health: Some("Grey".to_string()),
        })
    }
}
