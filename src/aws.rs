// ABOUTME: Shared AWS SDK configuration for the S3 and Elastic Beanstalk clients.
// ABOUTME: Builds an SdkConfig from resolved credentials and the configured region.

use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region, SdkConfig};

use crate::credentials::Credentials;

/// Region used when neither config nor the AWS default chain names one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Name reported to the SDK for credentials we resolved ourselves.
const PROVIDER_NAME: &str = "ebpush";

/// Build SDK config using `credentials` rather than the default credential chain.
pub async fn sdk_config(region: Option<&str>, credentials: &Credentials) -> SdkConfig {
    let region = RegionProviderChain::first_try(region.map(|r| Region::new(r.to_owned())))
        .or_default_provider()
        .or_else(Region::new(DEFAULT_REGION));

    let provider = aws_credential_types::Credentials::new(
        credentials.access_key(),
        credentials.secret_key(),
        credentials.session_token().map(str::to_owned),
        None,
        PROVIDER_NAME,
    );

    aws_config::defaults(BehaviorVersion::latest())
        .region(region)
        .credentials_provider(provider)
        .load()
        .await
}
