// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The think / acquire / eat / release loop run by each worker

use crate::config::DelayRange;
use crate::coordination::{PairGuard, PairTable};
use crate::error::CoordinatorError;
use crate::id::WorkerId;
use crate::observer::{NoopObserver, Phase, PhaseObserver};
use crate::shutdown::Shutdown;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Counters a worker updates as it runs
///
/// Shared with whoever spawned the worker so they stay readable after the
/// worker task is gone.
#[derive(Debug, Default)]
pub struct WorkerStats {
    meals: AtomicU64,
    longest_wait_ms: AtomicU64,
}

impl WorkerStats {
    pub fn meals(&self) -> u64 {
        self.meals.load(Ordering::Relaxed)
    }

    pub fn longest_wait(&self) -> Duration {
        Duration::from_millis(self.longest_wait_ms.load(Ordering::Relaxed))
    }

    pub fn report(&self, worker: WorkerId) -> WorkerReport {
        WorkerReport {
            worker,
            meals: self.meals(),
            longest_wait: self.longest_wait(),
        }
    }

    fn record_meal(&self, waited: Duration) {
        self.meals.fetch_add(1, Ordering::Relaxed);
        let waited_ms = u64::try_from(waited.as_millis()).unwrap_or(u64::MAX);
        self.longest_wait_ms.fetch_max(waited_ms, Ordering::Relaxed);
    }
}

/// Final counters for one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub worker: WorkerId,
    pub meals: u64,
    #[serde(with = "humantime_serde")]
    pub longest_wait: Duration,
}

/// One seat at the table
pub struct Worker {
    id: WorkerId,
    table: Arc<dyn PairTable>,
    observer: Arc<dyn PhaseObserver>,
    think: DelayRange,
    eat: DelayRange,
    stats: Arc<WorkerStats>,
    rng: StdRng,
}

impl Worker {
    pub fn new(id: WorkerId, table: Arc<dyn PairTable>, think: DelayRange, eat: DelayRange) -> Self {
        Self {
            id,
            table,
            observer: Arc::new(NoopObserver),
            think,
            eat,
            stats: Arc::new(WorkerStats::default()),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn PhaseObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Draw delays from a fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn stats(&self) -> Arc<WorkerStats> {
        self.stats.clone()
    }

    /// Cycle until `shutdown` fires
    ///
    /// Returns `Ok` on shutdown, whether it lands while thinking, waiting or
    /// eating. A held pair is always released before returning.
    pub async fn run(mut self, shutdown: Shutdown) -> Result<(), CoordinatorError> {
        tracing::debug!(worker = self.id.0, table = self.table.name(), "worker started");
        let table = self.table.clone();

        while !shutdown.is_triggered() {
            self.observer.observe(self.id, Phase::Thinking);
            let think = self.think.sample(&mut self.rng);
            if !pause(think, &shutdown).await {
                break;
            }

            self.observer.observe(self.id, Phase::Waiting);
            let started = Instant::now();
            let guard = match PairGuard::acquire(&*table, self.id, &shutdown).await {
                Ok(guard) => guard,
                Err(CoordinatorError::Cancelled) => break,
                Err(e) => return Err(e),
            };
            self.observer.observe(self.id, Phase::Acquired);
            self.stats.record_meal(started.elapsed());

            self.observer.observe(self.id, Phase::Eating);
            let eat = self.eat.sample(&mut self.rng);
            let finished = pause(eat, &shutdown).await;
            drop(guard);
            self.observer.observe(self.id, Phase::Released);
            if !finished {
                break;
            }
        }

        tracing::debug!(worker = self.id.0, meals = self.stats.meals(), "worker stopped");
        Ok(())
    }
}

/// Sleep for `delay`; false if shutdown interrupted it
async fn pause(delay: Duration, shutdown: &Shutdown) -> bool {
    tokio::select! {
        biased;
        () = shutdown.cancelled() => false,
        () = tokio::time::sleep(delay) => true,
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
