// ABOUTME: Release pipeline using the type state pattern.
// ABOUTME: Exports the state markers, the Pipeline struct, its step components, and the run driver.

mod error;
mod machine;
mod rollout;
mod run;
mod state;
mod transitions;
mod upload;

pub use error::{PipelineError, PipelineErrorKind};
pub use machine::Pipeline;
pub use rollout::{DeploySummary, EnvironmentDeployer};
pub use run::{RunOutcome, run};
pub use state::{Deployed, PipelineState, Prepared, Uploaded};
pub use transitions::Report;
pub use upload::{ArtifactUploader, Interrupt, InterruptHandle, UploadSummary};
