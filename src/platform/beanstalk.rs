// ABOUTME: Elastic Beanstalk implementation of HostingPlatform.
// ABOUTME: Wraps CreateApplicationVersion and UpdateEnvironment from aws-sdk-elasticbeanstalk.

use async_trait::async_trait;
use aws_sdk_elasticbeanstalk::Client;
use aws_sdk_elasticbeanstalk::error::DisplayErrorContext;
use aws_sdk_elasticbeanstalk::operation::update_environment::UpdateEnvironmentOutput;
use aws_sdk_elasticbeanstalk::types::S3Location;
use snafu::OptionExt;

use crate::aws;
use crate::credentials::Credentials;

use super::error::{MalformedResponseSnafu, PlatformError};
use super::traits::{
    ApplicationVersion, EnvironmentDescription, EnvironmentUpdate, HostingPlatform,
    VersionRequest,
};

/// Rolls out versions on AWS Elastic Beanstalk.
#[derive(Debug, Clone, Default)]
pub struct Beanstalk {
    region: Option<String>,
}

impl Beanstalk {
    pub fn new(region: Option<String>) -> Self {
        Self { region }
    }

    async fn client(&self, credentials: &Credentials) -> Client {
        Client::new(&aws::sdk_config(self.region.as_deref(), credentials).await)
    }
}

#[async_trait]
impl HostingPlatform for Beanstalk {
    async fn create_application_version(
        &self,
        request: &VersionRequest,
        credentials: &Credentials,
    ) -> Result<ApplicationVersion, PlatformError> {
        let bundle = S3Location::builder()
            .s3_bucket(&request.source.bucket)
            .s3_key(&request.source.key)
            .build();

        let output = self
            .client(credentials)
            .await
            .create_application_version()
            .application_name(&request.application)
            .version_label(&request.version_label)
            .source_bundle(bundle)
            .send()
            .await
            .map_err(|err| PlatformError::CreateVersion {
                application: request.application.clone(),
                version_label: request.version_label.clone(),
                message: DisplayErrorContext(&err).to_string(),
            })?;

        let version = output.application_version().context(MalformedResponseSnafu {
            field: "application version",
        })?;
        let source = version.source_bundle();

        Ok(ApplicationVersion {
            application: version
                .application_name()
                .unwrap_or(request.application.as_str())
                .to_string(),
            version_label: version
                .version_label()
                .unwrap_or(request.version_label.as_str())
                .to_string(),
            source_bucket: source
                .and_then(|s| s.s3_bucket())
                .unwrap_or(request.source.bucket.as_str())
                .to_string(),
            source_key: source
                .and_then(|s| s.s3_key())
                .unwrap_or(request.source.key.as_str())
                .to_string(),
        })
    }

    async fn update_environment(
        &self,
        request: &EnvironmentUpdate,
        credentials: &Credentials,
    ) -> Result<EnvironmentDescription, PlatformError> {
        let output = self
            .client(credentials)
            .await
            .update_environment()
            .environment_name(&request.environment)
            .version_label(&request.version_label)
            .send()
            .await
            .map_err(|err| PlatformError::UpdateEnvironment {
                environment: request.environment.clone(),
                version_label: request.version_label.clone(),
                message: DisplayErrorContext(&err).to_string(),
            })?;

        Ok(describe_update(&output, request))
    }
}

/// The environment has already been repointed when this runs, so fields the
/// response leaves out fall back to the request instead of failing.
fn describe_update(
    output: &UpdateEnvironmentOutput,
    request: &EnvironmentUpdate,
) -> EnvironmentDescription {
    EnvironmentDescription {
        application: output
            .application_name()
            .unwrap_or(request.application.as_str())
            .to_string(),
        environment_id: output.environment_id().map(str::to_owned),
        environment_name: output
            .environment_name()
            .unwrap_or(request.environment.as_str())
            .to_string(),
        version_label: output
            .version_label()
            .unwrap_or(request.version_label.as_str())
            .to_string(),
        status: output.status().map(|s| s.as_str().to_string()),
        health: output.health().map(|h| h.as_str().to_string()),
    }
}
