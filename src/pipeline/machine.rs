// ABOUTME: Generic pipeline struct parameterized by state marker.
// ABOUTME: Holds the frozen configuration, derived remote key, and memoized credentials.

use crate::config::Config;
use crate::credentials::CredentialResolver;
use crate::naming::RemoteKey;

use super::state::{Deployed, Uploaded};
use super::{DeploySummary, UploadSummary};

/// A release in progress, parameterized by its current state.
///
/// Transitions consume `self`, so every instance performs at most one upload
/// and one rollout. The configuration is only reachable by shared reference
/// once the pipeline exists.
#[derive(Debug)]
pub struct Pipeline<S> {
    pub(crate) config: Config,
    pub(crate) target: RemoteKey,
    pub(crate) resolver: CredentialResolver,
    pub(crate) state: S,
}

impl<S> Pipeline<S> {
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Where the artifact is (or already was) stored.
    pub fn target(&self) -> &RemoteKey {
        &self.target
    }

    /// Version label after suffixing.
    pub fn version_label(&self) -> &str {
        &self.config.version_label
    }

    pub fn credentials_resolved(&self) -> bool {
        self.resolver.is_resolved()
    }

    pub(crate) fn advance<T>(self, state: T) -> Pipeline<T> {
        Pipeline {
            config: self.config,
            target: self.target,
            resolver: self.resolver,
            state,
        }
    }
}

impl Pipeline<Uploaded> {
    /// Upload result, or `None` when the upload was skipped.
    pub fn upload_summary(&self) -> Option<&UploadSummary> {
        self.state.upload.as_ref()
    }
}

impl Pipeline<Deployed> {
    pub fn upload_summary(&self) -> Option<&UploadSummary> {
        self.state.upload.as_ref()
    }

    /// Rollout result, or `None` when the rollout was skipped.
    pub fn deploy_summary(&self) -> Option<&DeploySummary> {
        self.state.deploy.as_ref()
    }
}
