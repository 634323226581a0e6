// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The acquire/release contract shared by every table implementation

use crate::error::CoordinatorError;
use crate::id::WorkerId;
use crate::shutdown::Shutdown;
use async_trait::async_trait;

/// A ring of resources handed out to workers two at a time
///
/// `acquire` returns only once the worker holds both of its resources, or
/// with `CoordinatorError::Cancelled` holding none of them. `release` never
/// blocks; releasing a pair that is not held is a no-op.
#[async_trait]
pub trait PairTable: Send + Sync {
    /// Number of workers (and resources) around the ring
    fn seats(&self) -> usize;

    /// Strategy name used in logs and reports
    fn name(&self) -> &'static str;

    async fn acquire(&self, worker: WorkerId, shutdown: &Shutdown) -> Result<(), CoordinatorError>;

    fn release(&self, worker: WorkerId) -> Result<(), CoordinatorError>;
}

/// Reject ids outside `0..seats`
pub(crate) fn check_worker(worker: WorkerId, seats: usize) -> Result<(), CoordinatorError> {
    if worker.0 < seats {
        Ok(())
    } else {
        Err(CoordinatorError::InvalidWorker { worker, seats })
    }
}
