// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ebpush::config::ConfigOverrides;

#[derive(Parser)]
#[command(name = "ebpush")]
#[command(about = "Upload a build artifact to S3 and roll it out to Elastic Beanstalk")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final result and errors
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Emit JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new ebpush.yml configuration file
    Init {
        /// Elastic Beanstalk application name
        #[arg(short, long)]
        application: Option<String>,

        /// Elastic Beanstalk environment name
        #[arg(short, long)]
        environment: Option<String>,

        /// Overwrite an existing ebpush.yml
        #[arg(long)]
        force: bool,
    },

    /// Upload the artifact and deploy it
    Push(ReleaseArgs),

    /// Show the derived key and version label without contacting AWS
    Plan(ReleaseArgs),
}

/// Flags shared by commands that read the release configuration.
#[derive(Args, Debug, Default)]
pub struct ReleaseArgs {
    /// Path to the configuration file (default: discover ebpush.yml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Local artifact to upload
    #[arg(long)]
    pub artifact: Option<PathBuf>,

    /// Target S3 bucket
    #[arg(long)]
    pub bucket: Option<String>,

    /// Target S3 object key
    #[arg(long)]
    pub key: Option<String>,

    /// Elastic Beanstalk application name
    #[arg(long)]
    pub application: Option<String>,

    /// Elastic Beanstalk environment name
    #[arg(long)]
    pub environment: Option<String>,

    /// Application version label
    #[arg(long)]
    pub version_label: Option<String>,

    /// Appended to the version label
    #[arg(long)]
    pub version_suffix: Option<String>,

    /// Inserted into the object key
    #[arg(long)]
    pub key_suffix: Option<String>,

    /// Deploy an object that is already in S3
    #[arg(long)]
    pub skip_upload: bool,

    /// Upload without deploying
    #[arg(long)]
    pub skip_deploy: bool,

    /// AWS access key id
    #[arg(long)]
    pub access_key: Option<String>,

    /// AWS secret access key
    #[arg(long)]
    pub secret_key: Option<String>,

    /// Properties file with accessKey and secretKey
    #[arg(long)]
    pub credentials_file: Option<PathBuf>,

    /// AWS region
    #[arg(long)]
    pub region: Option<String>,
}

impl ReleaseArgs {
    /// Split into the config path and the field overrides.
    pub fn into_parts(self) -> (Option<PathBuf>, ConfigOverrides) {
        let overrides = ConfigOverrides {
            artifact: self.artifact,
            bucket: self.bucket,
            key: self.key,
            application: self.application,
            environment: self.environment,
            version_label: self.version_label,
            version_suffix: self.version_suffix,
            key_suffix: self.key_suffix,
            skip_upload: self.skip_upload,
            skip_deploy: self.skip_deploy,
            access_key: self.access_key,
            secret_key: self.secret_key,
            credentials_file: self.credentials_file,
            region: self.region,
        };
        (self.config, overrides)
    }
}
