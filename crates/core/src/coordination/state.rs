// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ring state guarded by the coordinator
//!
//! Holds who owns each resource, when each worker was last served and which
//! workers are currently parked in `acquire_pair`. The coordinator keeps one
//! `RingState` behind a single mutex; everything here is plain data so
//! admission policies can inspect it without further locking.

use crate::error::CoordinatorError;
use crate::id::{ResourceId, WorkerId};
use std::time::{Duration, Instant};

/// How long a worker has gone without being served
///
/// `Never` ranks above every real wait, so a worker that has not eaten yet is
/// always the most starved one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Wait {
    Served(Duration),
    Never,
}

impl Wait {
    /// True when this wait is strictly longer than `other + margin`
    pub fn exceeds(self, other: Wait, margin: Duration) -> bool {
        match (self, other) {
            (Wait::Never, Wait::Never) => false,
            (Wait::Never, Wait::Served(_)) => true,
            (Wait::Served(_), Wait::Never) => false,
            (Wait::Served(a), Wait::Served(b)) => a > b.saturating_add(margin),
        }
    }
}

/// Availability and fairness bookkeeping for a ring of `seats` workers
#[derive(Clone, Debug)]
pub struct RingState {
    /// Current holder of each resource; `None` means available
    holders: Vec<Option<WorkerId>>,
    /// When each worker was last admitted
    last_served: Vec<Option<Instant>>,
    /// When each parked worker started waiting
    waiting_since: Vec<Option<Instant>>,
}

impl RingState {
    /// All resources available, nobody served, nobody waiting
    pub fn new(seats: usize) -> Self {
        Self {
            holders: vec![None; seats],
            last_served: vec![None; seats],
            waiting_since: vec![None; seats],
        }
    }

    pub fn seats(&self) -> usize {
        self.holders.len()
    }

    pub fn is_available(&self, resource: ResourceId) -> bool {
        self.holders[resource.0].is_none()
    }

    pub fn holder(&self, resource: ResourceId) -> Option<WorkerId> {
        self.holders[resource.0]
    }

    /// Number of resources currently held by `worker`
    pub fn held_by(&self, worker: WorkerId) -> usize {
        self.holders
            .iter()
            .filter(|h| **h == Some(worker))
            .count()
    }

    /// True when `worker` owns both of its resources
    pub fn holds_pair(&self, worker: WorkerId) -> bool {
        let (left, right) = worker.pair(self.seats());
        self.holder(left) == Some(worker) && self.holder(right) == Some(worker)
    }

    /// Workers currently holding their pair
    pub fn eating(&self) -> Vec<WorkerId> {
        WorkerId::all(self.seats())
            .filter(|w| self.holds_pair(*w))
            .collect()
    }

    pub fn last_served(&self, worker: WorkerId) -> Option<Instant> {
        self.last_served[worker.0]
    }

    /// Time since `worker` was last served, measured at `now`
    pub fn wait_of(&self, worker: WorkerId, now: Instant) -> Wait {
        match self.last_served[worker.0] {
            Some(at) => Wait::Served(now.saturating_duration_since(at)),
            None => Wait::Never,
        }
    }

    pub fn is_waiting(&self, worker: WorkerId) -> bool {
        self.waiting_since[worker.0].is_some()
    }

    /// Workers currently parked in `acquire_pair`
    pub fn waiting(&self) -> Vec<WorkerId> {
        WorkerId::all(self.seats())
            .filter(|w| self.is_waiting(*w))
            .collect()
    }

    /// When `worker` started its current wait, if it is waiting
    pub fn waiting_since(&self, worker: WorkerId) -> Option<Instant> {
        self.waiting_since[worker.0]
    }

    pub(crate) fn begin_wait(&mut self, worker: WorkerId, now: Instant) {
        self.waiting_since[worker.0].get_or_insert(now);
    }

    pub(crate) fn end_wait(&mut self, worker: WorkerId) -> Option<Instant> {
        self.waiting_since[worker.0].take()
    }

    /// Mark both of `worker`'s resources as held and stamp its service time
    ///
    /// Fails without touching anything if either resource is taken.
    pub(crate) fn claim(&mut self, worker: WorkerId, now: Instant) -> Result<(), CoordinatorError> {
        let (left, right) = worker.pair(self.seats());
        for resource in [left, right] {
            if let Some(owner) = self.holder(resource) {
                return Err(CoordinatorError::InvariantViolation(format!(
                    "{worker} claimed {resource} held by {owner}"
                )));
            }
        }
        self.holders[left.0] = Some(worker);
        self.holders[right.0] = Some(worker);
        self.last_served[worker.0] = Some(now);
        Ok(())
    }

    /// Free whatever `worker` holds; returns false if it held nothing
    pub(crate) fn release(&mut self, worker: WorkerId) -> bool {
        let mut freed = false;
        for slot in self.holders.iter_mut().filter(|h| **h == Some(worker)) {
            *slot = None;
            freed = true;
        }
        freed
    }

    /// Check mutual exclusion and atomic pairing
    ///
    /// A resource has at most one holder by construction, so this looks for
    /// resources held outside the holder's pair, workers holding exactly one
    /// of their resources, and workers that are both eating and parked.
    pub fn verify(&self) -> Result<(), CoordinatorError> {
        let seats = self.seats();
        for (index, holder) in self.holders.iter().enumerate() {
            if let Some(worker) = holder {
                let (left, right) = worker.pair(seats);
                if index != left.0 && index != right.0 {
                    return Err(CoordinatorError::InvariantViolation(format!(
                        "{worker} holds {} outside its pair",
                        ResourceId(index)
                    )));
                }
            }
        }
        for worker in WorkerId::all(seats) {
            let (left, right) = worker.pair(seats);
            let holds_left = self.holder(left) == Some(worker);
            let holds_right = self.holder(right) == Some(worker);
            if holds_left != holds_right {
                return Err(CoordinatorError::InvariantViolation(format!(
                    "{worker} holds one resource of its pair"
                )));
            }
            if holds_left && self.is_waiting(worker) {
                return Err(CoordinatorError::InvariantViolation(format!(
                    "{worker} is waiting while holding its pair"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
