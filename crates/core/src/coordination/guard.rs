// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scoped ownership of a worker's pair

use super::table::PairTable;
use crate::error::CoordinatorError;
use crate::id::WorkerId;
use crate::shutdown::Shutdown;

/// Holds a worker's pair until dropped
///
/// Dropping the guard releases the pair, so the release path runs on every
/// exit: normal return, cancellation mid-meal, or a panic unwinding the task.
#[must_use = "dropping the guard releases the pair immediately"]
pub struct PairGuard<'a, T: PairTable + ?Sized> {
    table: &'a T,
    worker: WorkerId,
}

impl<'a, T: PairTable + ?Sized> PairGuard<'a, T> {
    /// Wait for `worker`'s pair on `table`
    pub async fn acquire(
        table: &'a T,
        worker: WorkerId,
        shutdown: &Shutdown,
    ) -> Result<Self, CoordinatorError> {
        table.acquire(worker, shutdown).await?;
        Ok(Self { table, worker })
    }

    /// Wrap a pair that `worker` already holds on `table`
    pub(crate) fn acquired(table: &'a T, worker: WorkerId) -> Self {
        Self { table, worker }
    }

    pub fn worker(&self) -> WorkerId {
        self.worker
    }
}

impl<T: PairTable + ?Sized> Drop for PairGuard<'_, T> {
    fn drop(&mut self) {
        if let Err(e) = self.table.release(self.worker) {
            tracing::error!(worker = self.worker.0, error = %e, "release on drop failed");
        }
    }
}

impl<T: PairTable + ?Sized> std::fmt::Debug for PairGuard<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairGuard")
            .field("table", &self.table.name())
            .field("worker", &self.worker)
            .finish()
    }
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;
