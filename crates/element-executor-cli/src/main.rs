//! Element executor CLI entry point

use clap::Parser;
use element_executor::{ExecutorClient, ExecutorConfig};
use element_executor_cli::{
    cli::{Cli, Commands},
    commands::{BatchCommand, ExtractCommand, TraceCommand, TriggerCommand, WaitCommand},
    error::CliResult,
    utils::{init_tracing, ColoredOutput},
};
use tracing::{debug, info};

fn main() {
    let exit_code = match run() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {}", ColoredOutput::error("Error:"), e);
            1
        }
    };

    std::process::exit(exit_code);
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;

    // Disable colored output if requested
    if cli.no_color {
        colored::control::set_override(false);
    }

    info!("Element executor CLI v{}", env!("CARGO_PKG_VERSION"));

    let config = ExecutorConfig::load(cli.config.as_deref())?;
    debug!(?config, "Loaded configuration");
    let client = ExecutorClient::new(config)?;

    match cli.command {
        Commands::Trigger { execution, wait } => TriggerCommand::run(&client, execution, wait),

        Commands::Trace {
            execution_id,
            fields,
            format,
        } => TraceCommand::run(&client, &execution_id, &fields, format),

        Commands::Wait {
            execution_id,
            max_wait_secs,
            interval_secs,
        } => WaitCommand::run(&client, &execution_id, max_wait_secs, interval_secs),

        Commands::Extract {
            execution,
            fields,
            format,
        } => ExtractCommand::run(&client, execution, &fields, format),

        Commands::Batch { tasks } => BatchCommand::run(&client, &tasks),
    }
}
