// ABOUTME: Hosting platform capability trait consumed by the environment deployer.
// ABOUTME: Registers application versions and points environments at them.

use async_trait::async_trait;

use crate::credentials::Credentials;
use crate::naming::RemoteKey;

use super::error::PlatformError;

/// Register `version_label` of `application` from the object at `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRequest {
    pub application: String,
    pub version_label: String,
    pub source: RemoteKey,
}

/// The platform's description of a registered version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationVersion {
    pub application: String,
    pub version_label: String,
    pub source_bucket: String,
    pub source_key: String,
}

/// Switch `environment` of `application` to run `version_label`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentUpdate {
    pub application: String,
    pub environment: String,
    pub version_label: String,
}

/// The platform's description of an environment after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentDescription {
    pub application: String,
    pub environment_id: Option<String>,
    pub environment_name: String,
    pub version_label: String,
    pub status: Option<String>,
    pub health: Option<String>,
}

/// Operations the rollout needs from the hosting platform.
#[async_trait]
pub trait HostingPlatform: Send + Sync {
    async fn create_application_version(
        &self,
        request: &VersionRequest,
        credentials: &Credentials,
    ) -> Result<ApplicationVersion, PlatformError>;

    async fn update_environment(
        &self,
        request: &EnvironmentUpdate,
        credentials: &Credentials,
    ) -> Result<EnvironmentDescription, PlatformError>;
}
