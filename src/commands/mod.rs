// ABOUTME: Command module aggregator for the ebpush CLI.
// ABOUTME: Re-exports push and plan handlers and shared config loading.

mod plan;
mod push;

use std::path::Path;

use ebpush::config::{Config, ConfigOverrides};
use ebpush::error::Result;

pub use plan::plan;
pub use push::push;

/// Load the explicit config file, or discover one in `cwd`, then apply CLI
/// overrides. Without any file every field has to come from flags.
pub fn load_config(
    cwd: &Path,
    explicit: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<Config> {
    let config = match explicit {
        Some(path) => Config::load(path)?,
        None => Config::discover_or_default(cwd)?,
    };
    Ok(config.with_overrides(overrides))
}
