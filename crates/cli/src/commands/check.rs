// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::{Context, Result};
use clap::Args;
use dine_core::TableConfig;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Config file to validate
    pub file: PathBuf,
}

pub fn check_config(args: CheckArgs) -> Result<()> {
    let config = TableConfig::load(&args.file)
        .with_context(|| format!("invalid config {}", args.file.display()))?;

    println!("{}: ok", args.file.display());
    println!("  workers: {}", config.workers);
    println!("  strategy: {}", config.strategy);
    println!("  run for: {}", humantime::format_duration(config.run_for));
    println!("  grace: {}", humantime::format_duration(config.grace));
    println!("  think: {}", config.think);
    println!("  eat: {}", config.eat);
    if config.strategy == dine_core::Strategy::Fairness {
        println!(
            "  starvation threshold: {}",
            humantime::format_duration(config.starvation_threshold)
        );
        println!(
            "  fairness margin: {}",
            humantime::format_duration(config.fairness_margin)
        );
    }
    Ok(())
}
