// ABOUTME: Plan command implementation.
// ABOUTME: Prints the derived release configuration without credentials or network access.

use ebpush::config::Config;
use ebpush::error::Result;
use ebpush::naming::{RemoteKey, apply_suffixes};
use ebpush::output::Output;

/// Validate, apply suffixes, and print what `push` would do.
pub fn plan(mut config: Config, output: &Output) -> Result<()> {
    config.validate()?;
    apply_suffixes(&mut config, output);
    config.dump(output);

    let step = |skipped: bool| if skipped { "skipped" } else { "yes" };
    output.info(&format!("Upload:         {}", step(config.skip_upload)));
    output.info(&format!("Deploy:         {}", step(config.skip_deploy)));

    let target = RemoteKey::new(&config.bucket, &config.key);
    output.success(&format!("{target} -> {}", config.version_label));
    Ok(())
}
