// ABOUTME: Push command implementation.
// ABOUTME: Runs the release pipeline against S3 and Elastic Beanstalk.

use ebpush::config::Config;
use ebpush::error::Result;
use ebpush::output::Output;
use ebpush::pipeline::{self, Interrupt};
use ebpush::platform::Beanstalk;
use ebpush::storage::S3Store;

/// Upload and deploy as configured.
pub async fn push(config: Config, output: &Output) -> Result<()> {
    let store = S3Store::new(config.region.clone());
    let platform = Beanstalk::new(config.region.clone());
    let mut interrupt = Interrupt::ctrl_c();

    let outcome = pipeline::run(config, &store, &platform, output, &mut interrupt).await;

    // Emit collected warnings
    for warning in outcome.diagnostics.warnings() {
        output.warning(&warning.message);
    }

    if let Some(err) = outcome.error {
        return Err(err.into());
    }

    let message = match outcome.report {
        Some(report) if report.deploy.is_some() => format!(
            "Deployed {} from {}",
            report.version_label, report.target
        ),
        Some(report) if report.upload.is_some() => format!("Uploaded {}", report.target),
        _ => "Nothing to do".to_string(),
    };
    output.success(&message);
    Ok(())
}
