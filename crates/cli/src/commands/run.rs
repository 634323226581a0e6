// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Default command: set the table and run it

use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use clap::Args;
use dine_core::{DelayRange, Harness, Shutdown, Strategy, TableConfig};
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal::unix::{signal, SignalKind};

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Table config file (TOML); flags override its values
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Number of workers around the table
    #[arg(long, short)]
    pub workers: Option<usize>,

    /// fairness, greedy, capacity, asymmetric, gated or left-first
    #[arg(long, short)]
    pub strategy: Option<Strategy>,

    /// How long to run, e.g. "2m" or "30s"
    #[arg(long, short, value_parser = humantime::parse_duration)]
    pub duration: Option<Duration>,

    /// Time allowed for workers to stop after the run ends
    #[arg(long, value_parser = humantime::parse_duration)]
    pub grace: Option<Duration>,

    /// Thinking delay range, e.g. "1s..3s"
    #[arg(long)]
    pub think: Option<DelayRange>,

    /// Eating delay range, e.g. "500ms..1s"
    #[arg(long)]
    pub eat: Option<DelayRange>,

    /// Only log warnings and errors
    #[arg(long, short)]
    pub quiet: bool,

    /// Statistics output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl RunArgs {
    /// The config file (or defaults) with command-line overrides applied
    pub fn table_config(&self) -> Result<TableConfig> {
        let mut config = match &self.config {
            Some(path) => TableConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => TableConfig::default(),
        };

        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(duration) = self.duration {
            config.run_for = duration;
        }
        if let Some(grace) = self.grace {
            config.grace = grace;
        }
        if let Some(think) = self.think {
            config.think = think;
        }
        if let Some(eat) = self.eat {
            config.eat = eat;
        }

        config.validate()?;
        Ok(config)
    }
}

pub async fn run(args: RunArgs) -> Result<()> {
    let config = args.table_config()?;
    let harness = Harness::new(config)?;
    let shutdown = Shutdown::new();

    let signals = tokio::spawn(stop_on_signal(shutdown.clone()));
    let report = harness.run(shutdown).await;
    signals.abort();

    output::print_report(&report?, args.format);
    Ok(())
}

/// Trigger `shutdown` on SIGINT or SIGTERM
async fn stop_on_signal(shutdown: Shutdown) -> std::io::Result<()> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("received SIGTERM, stopping"),
        _ = sigint.recv() => tracing::info!("received SIGINT, stopping"),
    }
    shutdown.trigger();
    Ok(())
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
