// ABOUTME: Environment rollout step: registers the version, then repoints the environment.
// ABOUTME: Logs both platform responses field by field.

use crate::credentials::Credentials;
use crate::naming::RemoteKey;
use crate::output::Output;
use crate::platform::{
    ApplicationVersion, EnvironmentDescription, EnvironmentUpdate, HostingPlatform, PlatformError,
    VersionRequest,
};

/// What a finished rollout produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploySummary {
    pub version: ApplicationVersion,
    pub environment: EnvironmentDescription,
}

/// Performs the two platform calls of a rollout.
pub struct EnvironmentDeployer<'a> {
    platform: &'a dyn HostingPlatform,
    output: &'a Output,
}

impl<'a> EnvironmentDeployer<'a> {
    pub fn new(platform: &'a dyn HostingPlatform, output: &'a Output) -> Self {
        Self { platform, output }
    }

    /// Register `version_label` from `source` and point `environment` at it.
    ///
    /// The environment is only updated after the version was registered.
    /// Nothing is retried.
    pub async fn deploy(
        &self,
        source: &RemoteKey,
        application: &str,
        environment: &str,
        version_label: &str,
        credentials: &Credentials,
    ) -> Result<DeploySummary, PlatformError> {
        self.output.info("Connecting to Elastic Beanstalk");

        self.output.info(&format!(
            "Creating new version {application}/{version_label}"
        ));
        let version = self
            .platform
            .create_application_version(
                &VersionRequest {
                    application: application.to_string(),
                    version_label: version_label.to_string(),
                    source: source.clone(),
                },
                credentials,
            )
            .await?;
        self.dump_version(&version);

        self.output.info(&format!(
            "Updating environment {environment} with version {version_label}"
        ));
        let described = self
            .platform
            .update_environment(
                &EnvironmentUpdate {
                    application: application.to_string(),
                    environment: environment.to_string(),
                    version_label: version_label.to_string(),
                },
                credentials,
            )
            .await?;
        self.dump_environment(&described);

        Ok(DeploySummary {
            version,
            environment: described,
        })
    }

    fn dump_version(&self, version: &ApplicationVersion) {
        let out = self.output;
        out.info(&format!("  ApplicationName : {}", version.application));
        out.info(&format!("  VersionLabel    : {}", version.version_label));
        out.info(&format!(
            "  SourceBundle    : {}/{}",
            version.source_bucket, version.source_key
        ));
    }

    fn dump_environment(&self, env: &EnvironmentDescription) {
        let out = self.output;
        let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
        out.info(&format!("  ApplicationName : {}", env.application));
        out.info(&format!("  EnvironmentId   : {}", optional(&env.environment_id)));
        out.info(&format!("  EnvironmentName : {}", env.environment_name));
        out.info(&format!("  VersionLabel    : {}", env.version_label));
        out.info(&format!("  Status          : {}", optional(&env.status)));
        out.info(&format!("  Health          : {}", optional(&env.health)));
    }
}
