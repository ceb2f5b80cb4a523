// ABOUTME: Hosting platform error types with SNAFU pattern.
// ABOUTME: One variant per remote call plus responses missing required fields.

use snafu::Snafu;

/// Errors from the hosting platform.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum PlatformError {
    #[snafu(display(
        "failed to create version {version_label} of application {application}: {message}"
    ))]
    CreateVersion {
        application: String,
        version_label: String,
        message: String,
    },

    #[snafu(display(
        "failed to update environment {environment} to version {version_label}: {message}"
    ))]
    UpdateEnvironment {
        environment: String,
        version_label: String,
        message: String,
    },

    #[snafu(display("platform response is missing {field}"))]
    MalformedResponse { field: &'static str },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformErrorKind {
    /// Registering the application version failed.
    CreateVersion,
    /// Pointing the environment at the new version failed.
    UpdateEnvironment,
    /// The platform answered without data we rely on.
    MalformedResponse,
}

impl PlatformError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> PlatformErrorKind {
        match self {
            PlatformError::CreateVersion { .. } => PlatformErrorKind::CreateVersion,
            PlatformError::UpdateEnvironment { .. } => PlatformErrorKind::UpdateEnvironment,
            PlatformError::MalformedResponse { .. } => PlatformErrorKind::MalformedResponse,
        }
    }
}
