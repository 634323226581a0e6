// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-resource locking tables
//!
//! Each resource is its own async mutex and a worker picks its two up one at
//! a time. These tables exist as baselines for the coordinator: the
//! left-first order can deadlock, the asymmetric order and the gated table
//! each break the circular wait in a different way.

use super::table::{check_worker, PairTable};
use crate::error::CoordinatorError;
use crate::id::{ResourceId, WorkerId};
use crate::shutdown::Shutdown;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, OwnedSemaphorePermit, Semaphore};

/// Order in which a worker picks up its two resources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForkOrder {
    /// Everyone takes left then right. Deadlocks when all workers hold
    /// their left resource at once.
    LeftFirst,
    /// The last worker takes right then left
    Asymmetric,
}

/// Both resources (and the gate permit, if any) of an eating worker
struct Hold {
    _first: OwnedMutexGuard<()>,
    _second: OwnedMutexGuard<()>,
    _permit: Option<OwnedSemaphorePermit>,
}

pub struct ForkTable {
    forks: Vec<Arc<AsyncMutex<()>>>,
    order: ForkOrder,
    gate: Option<Arc<Semaphore>>,
    held: Mutex<Vec<Option<Hold>>>,
}

impl ForkTable {
    pub fn new(seats: usize, order: ForkOrder) -> Result<Self, CoordinatorError> {
        if order == ForkOrder::LeftFirst {
            tracing::warn!(seats, "left-first ordering can deadlock");
        }
        Self::build(seats, order, None)
    }

    /// Left-first ordering behind a gate that admits at most `seats - 1`
    /// workers to the table
    pub fn gated(seats: usize) -> Result<Self, CoordinatorError> {
        let gate = Arc::new(Semaphore::new(seats.saturating_sub(1)));
        Self::build(seats, ForkOrder::LeftFirst, Some(gate))
    }

    fn build(
        seats: usize,
        order: ForkOrder,
        gate: Option<Arc<Semaphore>>,
    ) -> Result<Self, CoordinatorError> {
        if seats < 2 {
            return Err(CoordinatorError::TooFewSeats(seats));
        }
        Ok(Self {
            forks: (0..seats).map(|_| Arc::new(AsyncMutex::new(()))).collect(),
            order,
            gate,
            held: Mutex::new((0..seats).map(|_| None).collect()),
        })
    }

    pub fn order(&self) -> ForkOrder {
        self.order
    }

    pub fn is_gated(&self) -> bool {
        self.gate.is_some()
    }

    /// Whether `worker` currently holds both of its resources
    pub fn is_holding(&self, worker: WorkerId) -> bool {
        self.lock_held()
            .get(worker.0)
            .is_some_and(|hold| hold.is_some())
    }

    /// Workers currently holding their pair, in id order
    pub fn eating(&self) -> Vec<WorkerId> {
        self.lock_held()
            .iter()
            .enumerate()
            .filter(|(_, hold)| hold.is_some())
            .map(|(i, _)| WorkerId(i))
            .collect()
    }

    /// The two resources of `worker` in pick-up order
    pub fn pick_up_order(&self, worker: WorkerId) -> (ResourceId, ResourceId) {
        let (left, right) = worker.pair(self.forks.len());
        match self.order {
            ForkOrder::Asymmetric if worker.0 == self.forks.len() - 1 => (right, left),
            _ => (left, right),
        }
    }

    async fn pick_up(
        &self,
        resource: ResourceId,
        shutdown: &Shutdown,
    ) -> Result<OwnedMutexGuard<()>, CoordinatorError> {
        let fork = self.forks[resource.0].clone();
        tokio::select! {
            biased;
            () = shutdown.cancelled() => Err(CoordinatorError::Cancelled),
            guard = fork.lock_owned() => Ok(guard),
        }
    }

    async fn enter(
        &self,
        shutdown: &Shutdown,
    ) -> Result<Option<OwnedSemaphorePermit>, CoordinatorError> {
        let Some(gate) = &self.gate else {
            return Ok(None);
        };
        tokio::select! {
            biased;
            () = shutdown.cancelled() => Err(CoordinatorError::Cancelled),
            permit = gate.clone().acquire_owned() => permit
                .map(Some)
                .map_err(|_| CoordinatorError::InvariantViolation("table gate closed".into())),
        }
    }

    fn lock_held(&self) -> MutexGuard<'_, Vec<Option<Hold>>> {
        self.held.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PairTable for ForkTable {
    fn seats(&self) -> usize {
        self.forks.len()
    }

    fn name(&self) -> &'static str {
        match (self.order, self.gate.is_some()) {
            (_, true) => "gated",
            (ForkOrder::LeftFirst, false) => "left-first",
            (ForkOrder::Asymmetric, false) => "asymmetric",
        }
    }

    async fn acquire(&self, worker: WorkerId, shutdown: &Shutdown) -> Result<(), CoordinatorError> {
        check_worker(worker, self.forks.len())?;
        if self.is_holding(worker) {
            return Err(CoordinatorError::AlreadyHolding(worker));
        }

        // Anything picked up so far is dropped (and so put back) on cancel
        let permit = self.enter(shutdown).await?;
        let (first, second) = self.pick_up_order(worker);
        let first = self.pick_up(first, shutdown).await?;
        let second = self.pick_up(second, shutdown).await?;

        self.lock_held()[worker.0] = Some(Hold {
            _first: first,
            _second: second,
            _permit: permit,
        });
        tracing::debug!(worker = worker.0, table = self.name(), "pair granted");
        Ok(())
    }

    fn release(&self, worker: WorkerId) -> Result<(), CoordinatorError> {
        check_worker(worker, self.forks.len())?;
        let hold = self.lock_held()[worker.0].take();
        match hold {
            Some(hold) => {
                drop(hold);
                tracing::debug!(worker = worker.0, "pair released");
            }
            None => tracing::warn!(worker = worker.0, "release without a held pair ignored"),
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "forks_tests.rs"]
mod tests;
