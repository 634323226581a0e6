// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Set a table from config, run its workers and collect their counters

use crate::clock::SystemClock;
use crate::config::{ConfigError, Strategy, TableConfig};
use crate::coordination::{
    CapacityPolicy, Coordinator, FairnessPolicy, ForkOrder, ForkTable, GreedyPolicy, PairTable,
};
use crate::error::CoordinatorError;
use crate::id::WorkerId;
use crate::observer::{PhaseObserver, TracingObserver};
use crate::shutdown::Shutdown;
use crate::worker::{Worker, WorkerReport, WorkerStats};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),
    #[error("{0} panicked")]
    WorkerPanicked(WorkerId),
}

/// Build the pair table a strategy calls for
pub fn build_table(config: &TableConfig) -> Result<Arc<dyn PairTable>, HarnessError> {
    let seats = config.workers;
    let table: Arc<dyn PairTable> = match config.strategy {
        Strategy::Fairness => {
            let policy = FairnessPolicy::new(config.starvation_threshold, config.fairness_margin)?;
            Arc::new(Coordinator::new(seats, policy, SystemClock)?)
        }
        Strategy::Greedy => Arc::new(Coordinator::new(seats, GreedyPolicy, SystemClock)?),
        Strategy::Capacity => Arc::new(Coordinator::new(
            seats,
            CapacityPolicy::for_seats(seats),
            SystemClock,
        )?),
        Strategy::Asymmetric => Arc::new(ForkTable::new(seats, ForkOrder::Asymmetric)?),
        Strategy::Gated => Arc::new(ForkTable::gated(seats)?),
        Strategy::LeftFirst => Arc::new(ForkTable::new(seats, ForkOrder::LeftFirst)?),
    };
    Ok(table)
}

/// Outcome of one run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub strategy: Strategy,
    pub workers: Vec<WorkerReport>,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
}

impl RunReport {
    pub fn total_meals(&self) -> u64 {
        self.workers.iter().map(|w| w.meals).sum()
    }

    /// Longest any single worker waited for its pair
    pub fn longest_wait(&self) -> Duration {
        self.workers
            .iter()
            .map(|w| w.longest_wait)
            .max()
            .unwrap_or_default()
    }
}

/// Runs every worker of a table for a bounded time
pub struct Harness {
    config: TableConfig,
    observer: Arc<dyn PhaseObserver>,
}

impl Harness {
    pub fn new(config: TableConfig) -> Result<Self, HarnessError> {
        config.validate()?;
        Ok(Self {
            config,
            observer: Arc::new(TracingObserver),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn PhaseObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Run until `run_for` elapses or `shutdown` fires, then stop the workers
    ///
    /// Workers get `grace` to finish their current step; stragglers are
    /// aborted, and abort drops their guards so nothing stays held.
    pub async fn run(&self, shutdown: Shutdown) -> Result<RunReport, HarnessError> {
        let table = build_table(&self.config)?;
        let started = Instant::now();
        tracing::info!(
            workers = self.config.workers,
            strategy = %self.config.strategy,
            run_for = %humantime::format_duration(self.config.run_for),
            "table set"
        );

        let mut tasks = Vec::with_capacity(self.config.workers);
        let mut stats: Vec<Arc<WorkerStats>> = Vec::with_capacity(self.config.workers);
        for id in WorkerId::all(self.config.workers) {
            let worker = Worker::new(id, table.clone(), self.config.think, self.config.eat)
                .with_observer(self.observer.clone());
            stats.push(worker.stats());
            let shutdown = shutdown.clone();
            tasks.push((id, tokio::spawn(worker.run(shutdown))));
        }

        tokio::select! {
            () = tokio::time::sleep(self.config.run_for) => {
                tracing::info!("run time elapsed, stopping workers");
            }
            () = shutdown.cancelled() => {
                tracing::info!("shutdown requested, stopping workers");
            }
        }
        shutdown.trigger();

        let outcome = self.join_workers(tasks).await;
        let report = RunReport {
            strategy: self.config.strategy,
            workers: stats
                .iter()
                .enumerate()
                .map(|(i, s)| s.report(WorkerId(i)))
                .collect(),
            elapsed: started.elapsed(),
        };
        outcome.map(|()| report)
    }

    async fn join_workers(
        &self,
        tasks: Vec<(WorkerId, JoinHandle<Result<(), CoordinatorError>>)>,
    ) -> Result<(), HarnessError> {
        let deadline = tokio::time::Instant::now() + self.config.grace;
        let mut first_error = None;

        for (id, mut task) in tasks {
            let joined = match tokio::time::timeout_at(deadline, &mut task).await {
                Ok(joined) => joined,
                Err(_) => {
                    tracing::warn!(worker = id.0, "worker did not stop within grace period, aborting");
                    task.abort();
                    task.await
                }
            };
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!(worker = id.0, error = %e, "worker failed");
                    first_error.get_or_insert(HarnessError::Coordinator(e));
                }
                Err(e) if e.is_panic() => {
                    tracing::error!(worker = id.0, "worker panicked");
                    first_error.get_or_insert(HarnessError::WorkerPanicked(id));
                }
                Err(_) => tracing::debug!(worker = id.0, "worker aborted"),
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
#[path = "harness_tests.rs"]
mod tests;
