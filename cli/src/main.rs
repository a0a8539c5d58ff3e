//! # Devloop Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point of the `devloop` CLI. It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the subcommand handlers
//! - Reporting errors (as a `reportError` event with `-o json`)
//!
//! ## Architecture
//!
//! - `devfile`: the command engine (model, loading, validation, resolution,
//!   runnable tree, push lifecycle). It only talks to the outside world through
//!   the `CommandExecutor` trait.
//! - `common`: Docker access, the Docker-backed executor, output.
//! - `core`: errors, configuration, push state.
//! - `commands`: one module per subcommand.
//!
//! ## Examples
//!
//! ```bash
//! devloop validate
//! devloop -v push --show-log
//! devloop -o json push --debug
//! devloop --devfile api/devfile.yaml test
//! ```
//!
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod common;
mod core;
mod devfile;

use crate::common::ui::{events::MachineEvent, OutputFormat};

#[derive(Parser, Debug)]
#[command(
    name = "devloop",
    about = "Devfile inner loop: build and run devfile commands in component containers",
    long_about = "Validates a devfile, resolves its Init/Build/Run/Debug/Test commands and runs them \
                  inside the project's component containers, restarting the application through \
                  the supervisor in the container.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    output: OutputFormat,

    /// Devfile to use instead of the configured one.
    #[arg(long, global = true, env = "DEVLOOP_DEVFILE")]
    devfile: Option<PathBuf>,
}

#[derive(Parser, Debug)]
enum Commands {
    Validate(commands::validate::ValidateArgs),
    Describe(commands::describe::DescribeArgs),
    #[command(alias = "p")]
    Push(commands::push::PushArgs),
    Test(commands::test::TestArgs),
    Exec(commands::exec::ExecArgs),
    Stop(commands::stop::StopArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let globals = commands::GlobalOptions {
        output: cli.output,
        devfile: cli.devfile,
    };
    let command_result = match cli.command {
        Commands::Validate(args) => commands::validate::handle_validate(args, &globals).await,
        Commands::Describe(args) => commands::describe::handle_describe(args, &globals).await,
        Commands::Push(args) => commands::push::handle_push(args, &globals).await,
        Commands::Test(args) => commands::test::handle_test(args, &globals).await,
        Commands::Exec(args) => commands::exec::handle_exec(args, &globals).await,
        Commands::Stop(args) => commands::stop::handle_stop(args, &globals).await,
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        if globals.output == OutputFormat::Json {
            MachineEvent::report_error(&e).emit();
        }
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
