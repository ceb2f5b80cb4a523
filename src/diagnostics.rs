// ABOUTME: Diagnostics accumulator for non-fatal warnings during a release run.
// ABOUTME: Collects problems that shouldn't fail the run but should be shown to users.

/// Collects non-fatal warnings during a pipeline run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during a run.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// A credentials file was configured but could not be used.
    pub fn credentials_file(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::CredentialsFile,
            message: message.into(),
        }
    }

    /// Releasing the transfer after an upload failed.
    pub fn transfer_shutdown(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::TransferShutdown,
            message: message.into(),
        }
    }

    /// Progress observation stopped before the transfer finished.
    pub fn observation_interrupted(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ObservationInterrupted,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// Credentials file unreadable or missing keys; the next source was tried.
    CredentialsFile,
    /// Transfer resources could not be released cleanly.
    TransferShutdown,
    /// An interrupt ended progress polling early; the upload kept running.
    ObservationInterrupted,
}
