// ABOUTME: State transition methods for the release pipeline.
// ABOUTME: Each method consumes self and returns the next state on success.

use crate::config::Config;
use crate::credentials::CredentialResolver;
use crate::diagnostics::Diagnostics;
use crate::naming::{RemoteKey, apply_suffixes};
use crate::output::Output;
use crate::platform::HostingPlatform;
use crate::storage::ObjectStore;

use super::error::PipelineError;
use super::machine::Pipeline;
use super::rollout::{DeploySummary, EnvironmentDeployer};
use super::state::{Deployed, Prepared, Uploaded};
use super::upload::{ArtifactUploader, Interrupt, UploadSummary};

/// Everything a completed run did.
#[derive(Debug, Clone)]
pub struct Report {
    pub target: RemoteKey,
    pub version_label: String,
    pub upload: Option<UploadSummary>,
    pub deploy: Option<DeploySummary>,
}

// =============================================================================
// Config -> Prepared
// =============================================================================

impl Pipeline<Prepared> {
    /// Validate `config`, apply the version and key suffixes, and log the
    /// result.
    ///
    /// Credentials are resolved here when at least one remote step will run,
    /// so a missing key pair fails the run before any network call. Skipping
    /// both steps never touches a credential source.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::InvalidConfiguration` or
    /// `PipelineError::NoCredentials`.
    pub fn prepare(
        mut config: Config,
        output: &Output,
        diag: &mut Diagnostics,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        apply_suffixes(&mut config, output);
        config.dump(output);

        let target = RemoteKey::new(&config.bucket, &config.key);
        let resolver = CredentialResolver::from_config(&config.credentials);

        if config.needs_remote() {
            let credentials = resolver.resolve(diag)?;
            output.info(&format!("Credentials loaded from {}", credentials.source()));
        }

        Ok(Pipeline {
            config,
            target,
            resolver,
            state: Prepared,
        })
    }

    /// Upload the artifact to the derived key.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::FileNotFound` before any transfer starts, or
    /// `PipelineError::Transfer` when the transfer fails.
    #[must_use = "pipeline state must be used"]
    pub async fn upload(
        self,
        store: &dyn ObjectStore,
        output: &Output,
        interrupt: &mut Interrupt,
        diag: &mut Diagnostics,
    ) -> Result<Pipeline<Uploaded>, PipelineError> {
        let credentials = self.resolver.resolve(diag)?;
        let summary = ArtifactUploader::new(store, output, &self.config.upload)
            .upload(
                &self.target,
                &self.config.artifact,
                credentials,
                interrupt,
                diag,
            )
            .await?;

        Ok(self.advance(Uploaded {
            upload: Some(summary),
        }))
    }

    /// Move on without uploading; a later rollout uses whatever object
    /// already exists at the derived key.
    pub fn skip_upload(self, output: &Output) -> Pipeline<Uploaded> {
        output.info("SKIPPING the upload step.");
        self.advance(Uploaded { upload: None })
    }
}

// =============================================================================
// Uploaded -> Deployed
// =============================================================================

impl Pipeline<Uploaded> {
    /// Register the version and roll it out to the environment.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Platform` if either platform call fails.
    #[must_use = "pipeline state must be used"]
    pub async fn deploy(
        self,
        platform: &dyn HostingPlatform,
        output: &Output,
        diag: &mut Diagnostics,
    ) -> Result<Pipeline<Deployed>, PipelineError> {
        let credentials = self.resolver.resolve(diag)?;
        let summary = EnvironmentDeployer::new(platform, output)
            .deploy(
                &self.target,
                &self.config.application,
                &self.config.environment,
                &self.config.version_label,
                credentials,
            )
            .await?;

        let upload = self.state.upload.clone();
        Ok(self.advance(Deployed {
            upload,
            deploy: Some(summary),
        }))
    }

    pub fn skip_deploy(self, output: &Output) -> Pipeline<Deployed> {
        output.info("SKIPPING the deployment step");
        let upload = self.state.upload.clone();
        self.advance(Deployed {
            upload,
            deploy: None,
        })
    }
}

// =============================================================================
// Deployed -> Report
// =============================================================================

impl Pipeline<Deployed> {
    pub fn finish(self) -> Report {
        Report {
            target: self.target,
            version_label: self.config.version_label,
            upload: self.state.upload,
            deploy: self.state.deploy,
        }
    }
}
