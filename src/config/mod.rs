// ABOUTME: Release configuration types and parsing for ebpush.yml.
// ABOUTME: Handles YAML discovery, CLI overrides, and the run configuration dump.

mod env_value;
mod init;
mod overrides;
mod validate;

pub use env_value::EnvValue;
pub use init::init_config;
pub use overrides::ConfigOverrides;
pub use validate::ValidationError;

use crate::error::{Error, Result};
use crate::output::Output;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "ebpush.yml";
pub const CONFIG_FILENAME_ALT: &str = "ebpush.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".ebpush/config.yml";

/// Smallest part S3 accepts for all but the last part of a multipart upload.
pub const MIN_PART_SIZE: u64 = 5 * 1024 * 1024;

/// Everything one release run needs, fully resolved.
///
/// Built from `ebpush.yml` plus command-line overrides. The pipeline takes
/// ownership during preparation, applies the suffixes, and from then on only
/// hands out shared references.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Local build output to publish.
    #[serde(default)]
    pub artifact: PathBuf,

    #[serde(default)]
    pub bucket: String,

    /// Object key the artifact is stored under (before suffixing).
    #[serde(default)]
    pub key: String,

    #[serde(default)]
    pub application: String,

    #[serde(default)]
    pub environment: String,

    /// Application version label to register (before suffixing).
    #[serde(default)]
    pub version_label: String,

    #[serde(default)]
    pub version_suffix: Option<String>,

    #[serde(default)]
    pub key_suffix: Option<String>,

    #[serde(default)]
    pub skip_upload: bool,

    #[serde(default)]
    pub skip_deploy: bool,

    #[serde(default)]
    pub credentials: CredentialsConfig,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub upload: UploadConfig,
}

/// Where credentials may come from. Sources are tried in field order.
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsConfig {
    #[serde(default)]
    pub access_key: Option<EnvValue>,

    #[serde(default)]
    pub secret_key: Option<EnvValue>,

    /// Properties file with `accessKey` / `secretKey` entries.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Fall back to `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`.
    #[serde(default = "default_true")]
    pub environment: bool,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        CredentialsConfig {
            access_key: None,
            secret_key: None,
            file: None,
            environment: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    #[serde(default = "default_part_size")]
    pub part_size: u64,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        UploadConfig {
            poll_interval: default_poll_interval(),
            part_size: default_part_size(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_part_size() -> u64 {
    MIN_PART_SIZE
}

fn default_concurrency() -> usize {
    4
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("loading configuration from {}", path.display());
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Discover a config file, starting from defaults when there is none.
    /// Useful when every field arrives on the command line.
    pub fn discover_or_default(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Whether at least one step will talk to AWS.
    pub fn needs_remote(&self) -> bool {
        !(self.skip_upload && self.skip_deploy)
    }

    /// Log the run configuration.
    pub fn dump(&self, output: &Output) {
        output.info(&format!("File to upload: {}", self.artifact.display()));
        output.info(&format!("S3 Bucket:      {}", self.bucket));
        output.info(&format!("S3 File key:    {}", self.key));
        output.info(&format!("Application:    {}", self.application));
        output.info(&format!("Environment:    {}", self.environment));
        output.info(&format!("App Version:    {}", self.version_label));
    }

    pub fn template() -> Self {
        Config {
            artifact: PathBuf::new(),
            bucket: "elasticbeanstalk-us-east-1-123456789012".to_string(),
            key: "my-app.war".to_string(),
            application: "my-app".to_string(),
            environment: "my-app-prod".to_string(),
            version_label: "1.0.0".to_string(),
            version_suffix: None,
            key_suffix: None,
            skip_upload: false,
            skip_deploy: false,
            credentials: CredentialsConfig::default(),
            region: None,
            upload: UploadConfig::default(),
        }
    }
}
