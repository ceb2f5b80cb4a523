// ABOUTME: Drives a pipeline from configuration to a single outcome.
// ABOUTME: Honors the skip flags and records which phase a failure happened in.

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::output::Output;
use crate::platform::HostingPlatform;
use crate::storage::ObjectStore;

use super::error::PipelineError;
use super::machine::Pipeline;
use super::state::PipelineState;
use super::transitions::Report;
use super::upload::Interrupt;

/// Result of one run.
#[derive(Debug)]
pub struct RunOutcome {
    /// `Done` or `Failed`.
    pub state: PipelineState,
    /// Phase that was active when the run failed.
    pub failed_in: Option<PipelineState>,
    pub report: Option<Report>,
    pub diagnostics: Diagnostics,
    pub error: Option<PipelineError>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.state == PipelineState::Done
    }
}

/// Run the whole release: prepare, upload unless skipped, deploy unless
/// skipped.
///
/// A failed upload stops the run; the rollout is never attempted against
/// an object that may not exist.
pub async fn run(
    config: Config,
    store: &dyn ObjectStore,
    platform: &dyn HostingPlatform,
    output: &Output,
    interrupt: &mut Interrupt,
) -> RunOutcome {
    let mut diagnostics = Diagnostics::default();
    let mut phase = PipelineState::Init;

    let result = drive(
        config,
        store,
        platform,
        output,
        interrupt,
        &mut diagnostics,
        &mut phase,
    )
    .await;

    match result {
        Ok(report) => RunOutcome {
            state: PipelineState::Done,
            failed_in: None,
            report: Some(report),
            diagnostics,
            error: None,
        },
        Err(err) => {
            tracing::debug!(%phase, error = %err, "pipeline failed");
            RunOutcome {
                state: PipelineState::Failed,
                failed_in: Some(phase),
                report: None,
                diagnostics,
                error: Some(err),
            }
        }
    }
}

async fn drive(
    config: Config,
    store: &dyn ObjectStore,
    platform: &dyn HostingPlatform,
    output: &Output,
    interrupt: &mut Interrupt,
    diag: &mut Diagnostics,
    phase: &mut PipelineState,
) -> Result<Report, PipelineError> {
    let pipeline = Pipeline::prepare(config, output, diag)?;

    let uploaded = if pipeline.config().skip_upload {
        pipeline.skip_upload(output)
    } else {
        *phase = PipelineState::Uploading;
        tracing::debug!(key = %pipeline.target(), "entering upload");
        pipeline.upload(store, output, interrupt, diag).await?
    };

    let deployed = if uploaded.config().skip_deploy {
        uploaded.skip_deploy(output)
    } else {
        *phase = PipelineState::Deploying;
        tracing::debug!(version = uploaded.version_label(), "entering deploy");
        uploaded.deploy(platform, output, diag).await?
    };

    *phase = PipelineState::Done;
    Ok(deployed.finish())
}
