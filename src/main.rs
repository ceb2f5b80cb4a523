// ABOUTME: Entry point for the ebpush CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use ebpush::config;
use ebpush::error::Result;
use ebpush::output::{Output, OutputMode};
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    let mut output = Output::new(mode);
    if matches!(cli.command, Commands::Push(_)) {
        output.start_timer();
    }
    let result = run(cli.command, &output).await;

    if let Err(e) = result {
        output.error(&e);
        std::process::exit(1);
    }
}

async fn run(command: Commands, output: &Output) -> Result<()> {
    let cwd = env::current_dir()?;
    match command {
        Commands::Init {
            application,
            environment,
            force,
        } => {
            config::init_config(&cwd, application.as_deref(), environment.as_deref(), force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::Push(args) => {
            let (path, overrides) = args.into_parts();
            let config = commands::load_config(&cwd, path.as_deref(), overrides)?;
            commands::push(config, output).await
        }
        Commands::Plan(args) => {
            let (path, overrides) = args.into_parts();
            let config = commands::load_config(&cwd, path.as_deref(), overrides)?;
            commands::plan(config, output)
        }
    }
}
