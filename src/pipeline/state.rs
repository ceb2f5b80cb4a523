// ABOUTME: Pipeline state marker types for the type state pattern.
// ABOUTME: Each marker carries the results gathered so far.

use std::fmt;

use super::rollout::DeploySummary;
use super::upload::UploadSummary;

/// Configuration validated, suffixes applied, credentials checked.
/// Available actions: `upload()`, `skip_upload()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Prepared;

/// Upload finished or skipped.
/// Available actions: `deploy()`, `skip_deploy()`
#[derive(Debug, Clone, Default)]
pub struct Uploaded {
    pub(crate) upload: Option<UploadSummary>,
}

/// Rollout finished or skipped.
/// Available actions: `finish()`
#[derive(Debug, Clone, Default)]
pub struct Deployed {
    pub(crate) upload: Option<UploadSummary>,
    pub(crate) deploy: Option<DeploySummary>,
}

/// Externally reported phase of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    Uploading,
    Deploying,
    Done,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Init => "init",
            PipelineState::Uploading => "uploading",
            PipelineState::Deploying => "deploying",
            PipelineState::Done => "done",
            PipelineState::Failed => "failed",
        };
        f.write_str(name)
    }
}
