// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for run statistics

use clap::ValueEnum;
use dine_core::RunReport;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Print the report to stdout in the specified format
pub fn print_report(report: &RunReport, format: OutputFormat) {
    match format {
        OutputFormat::Text => print!("{}", format_statistics(report)),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(report) {
                println!("{}", json);
            }
        }
    }
}

/// Per-worker meal counts followed by the total
pub fn format_statistics(report: &RunReport) -> String {
    let mut out = String::from("=== Statistics ===\n");
    for worker in &report.workers {
        let _ = writeln!(
            out,
            "Worker {} ate {} times (longest wait {:.1}s)",
            worker.worker.0,
            worker.meals,
            worker.longest_wait.as_secs_f64()
        );
    }
    let _ = writeln!(out, "Total meals: {}", report.total_meals());
    out
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
