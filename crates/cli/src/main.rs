// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! dine - workers sharing a ring of resources

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{check, run};

#[derive(Parser)]
#[command(
    name = "dine",
    version,
    about = "Run workers around a ring of shared resources",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: run::RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a table config file and print the effective settings
    CheckConfig(check::CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::CheckConfig(args)) => check::check_config(args),
        None => {
            setup_logging(cli.run.quiet);
            run::run(cli.run).await
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the default level
fn setup_logging(quiet: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_level = if quiet { "warn" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
